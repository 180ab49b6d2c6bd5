pub mod beat_indicator;
pub mod elapsed;
pub mod settings_dialog;
pub mod tempo;
pub mod transport;

pub use beat_indicator::BeatIndicator;
pub use elapsed::ElapsedDisplay;
pub use settings_dialog::SettingsDialog;
pub use tempo::TempoControl;
pub use transport::TransportControls;
