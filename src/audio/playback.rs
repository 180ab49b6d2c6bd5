use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("no audio output device available")]
    NoOutputDevice,
    #[error("audio stream failed: {0}")]
    StreamFailed(String),
    #[error("click voice is unavailable")]
    VoiceUnavailable,
}

/// A single preloaded click that can be rewound and replayed.
pub trait ClickPlayer {
    /// Seek to the start of the click and play it. Overlapping requests
    /// simply restart the same voice.
    fn restart(&mut self) -> Result<(), PlaybackError>;

    /// Change loudness without reopening the output.
    fn set_volume(&mut self, _volume: f32) {}
}

/// Fire-and-forget playback. A rejected request is logged and otherwise
/// ignored so the caller keeps ticking.
pub fn trigger(player: &mut dyn ClickPlayer) -> bool {
    match player.restart() {
        Ok(()) => true,
        Err(err) => {
            log::warn!("Audio playback failed: {}", err);
            false
        }
    }
}

/// Stand-in used when no output device could be opened.
#[derive(Debug, Default)]
pub struct SilentPlayer;

impl ClickPlayer for SilentPlayer {
    fn restart(&mut self) -> Result<(), PlaybackError> {
        Err(PlaybackError::NoOutputDevice)
    }
}
