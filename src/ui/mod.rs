pub mod app;
pub mod components;
pub mod keyboard;

pub use app::MetronomeApp;
