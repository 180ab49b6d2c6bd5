pub mod engine;
pub mod playback;
pub mod samples;

pub use engine::AudioEngine;
pub use playback::{ClickPlayer, PlaybackError, SilentPlayer};
pub use samples::Sample;
