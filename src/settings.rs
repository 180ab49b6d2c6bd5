use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use anyhow::Result;

use crate::metronome::{DEFAULT_BPM, MAX_BPM, MIN_BPM};

/// Audio output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
    pub master_volume: f32,
    pub preferred_device: Option<String>,
    /// WAV file used for the click; the built-in click is used when unset.
    pub click_sample: Option<PathBuf>,
}

impl Default for AudioSettings {
    fn default() -> Self {
        AudioSettings {
            master_volume: 1.0,
            preferred_device: None,
            click_sample: None,
        }
    }
}

impl AudioSettings {
    /// Validate audio settings values
    pub fn validate(&self) -> Result<()> {
        if !self.master_volume.is_finite() || self.master_volume < 0.0 || self.master_volume > 2.0 {
            return Err(anyhow::anyhow!("Master volume must be between 0.0 and 2.0"));
        }

        if let Some(ref path) = self.click_sample {
            if path.as_os_str().is_empty() {
                return Err(anyhow::anyhow!("Click sample path must not be empty"));
            }
        }

        Ok(())
    }

    /// Whether going from `self` to `other` needs a new output stream.
    /// Volume alone is applied to the running voice.
    pub fn requires_reopen(&self, other: &AudioSettings) -> bool {
        self.preferred_device != other.preferred_device || self.click_sample != other.click_sample
    }
}

/// UI settings for the application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UISettings {
    pub theme: String,
    pub ui_scale: f32,
}

impl Default for UISettings {
    fn default() -> Self {
        // Set default scale based on platform (2x for macOS, 1x for others)
        let default_scale = if cfg!(target_os = "macos") {
            2.0
        } else {
            1.0
        };

        UISettings {
            theme: "dark".to_string(),
            ui_scale: default_scale,
        }
    }
}

impl UISettings {
    /// Validate UI settings values
    pub fn validate(&self) -> Result<()> {
        if !["dark", "light", "auto"].contains(&self.theme.as_str()) {
            return Err(anyhow::anyhow!("Theme must be 'dark', 'light', or 'auto', got '{}'", self.theme));
        }

        // Check for NaN or infinite values first (before range checks)
        if !self.ui_scale.is_finite() {
            return Err(anyhow::anyhow!("UI scale must be a finite number, got {}", self.ui_scale));
        }

        if self.ui_scale < 0.5 {
            return Err(anyhow::anyhow!("UI scale {} is too small (minimum: 0.5)", self.ui_scale));
        }
        if self.ui_scale > 3.0 {
            return Err(anyhow::anyhow!("UI scale {} is too large (maximum: 3.0)", self.ui_scale));
        }

        Ok(())
    }

    /// Sanitize individual UI settings values, correcting invalid ones
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut corrections = Vec::new();

        if !["dark", "light", "auto"].contains(&self.theme.as_str()) {
            corrections.push(format!("Theme '{}' is invalid, changed to 'dark'", self.theme));
            self.theme = "dark".to_string();
        }

        if !self.ui_scale.is_finite() {
            let default_scale = UISettings::default().ui_scale;
            corrections.push(format!("UI scale {} is invalid, changed to {}", self.ui_scale, default_scale));
            self.ui_scale = default_scale;
        } else if self.ui_scale < 0.5 {
            corrections.push(format!("UI scale {} is too small, changed to 0.5", self.ui_scale));
            self.ui_scale = 0.5;
        } else if self.ui_scale > 3.0 {
            corrections.push(format!("UI scale {} is too large, changed to 3.0", self.ui_scale));
            self.ui_scale = 3.0;
        }

        corrections
    }

    /// Detect system theme preference
    pub fn detect_system_theme() -> String {
        match dark_light::detect() {
            dark_light::Mode::Dark => "dark".to_string(),
            dark_light::Mode::Light => "light".to_string(),
            dark_light::Mode::Default => "dark".to_string(),
        }
    }

    /// Resolve the actual theme to use based on settings
    pub fn resolve_theme(&self) -> String {
        match self.theme.as_str() {
            "auto" => Self::detect_system_theme(),
            "dark" | "light" => self.theme.clone(),
            _ => "dark".to_string(),
        }
    }
}

/// Which parts of the metronome widget are shown, and the tempo it opens with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetronomeSettings {
    pub initial_bpm: u32,
    pub keyboard_shortcuts: bool,
    pub show_elapsed_time: bool,
    pub show_step_buttons: bool,
}

impl Default for MetronomeSettings {
    fn default() -> Self {
        MetronomeSettings {
            initial_bpm: DEFAULT_BPM,
            keyboard_shortcuts: true,
            show_elapsed_time: true,
            show_step_buttons: true,
        }
    }
}

impl MetronomeSettings {
    pub fn validate(&self) -> Result<()> {
        if self.initial_bpm < MIN_BPM || self.initial_bpm > MAX_BPM {
            return Err(anyhow::anyhow!(
                "Initial BPM must be between {} and {}, got {}",
                MIN_BPM,
                MAX_BPM,
                self.initial_bpm
            ));
        }
        Ok(())
    }
}

/// Main application settings structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub ui: UISettings,
    #[serde(default)]
    pub metronome: MetronomeSettings,
}

impl AppSettings {
    /// Validate all settings
    pub fn validate(&self) -> Result<()> {
        self.audio.validate()?;
        self.ui.validate()?;
        self.metronome.validate()?;
        Ok(())
    }

    /// Get the settings file path for the current platform
    pub fn get_settings_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        let app_config_dir = config_dir.join("ticktock");
        std::fs::create_dir_all(&app_config_dir)?;

        Ok(app_config_dir.join("settings.json"))
    }

    /// Save settings to the platform settings file
    pub fn save_to_file(&self) -> Result<()> {
        let path = Self::get_settings_file_path()?;
        self.save_to_path(&path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::debug!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Load settings from file, fallback to defaults if file doesn't exist or is invalid
    pub fn load_from_file() -> Self {
        match Self::get_settings_file_path() {
            Ok(path) => {
                if path.exists() {
                    Self::load_from_path(&path)
                } else {
                    // File doesn't exist, use defaults and save them
                    let defaults = Self::default();
                    if let Err(err) = defaults.save_to_path(&path) {
                        log::warn!("Failed to save default settings: {}", err);
                    }
                    defaults
                }
            }
            Err(err) => {
                log::warn!("Failed to determine settings file path: {}. Using defaults.", err);
                Self::default()
            }
        }
    }

    pub fn load_from_path(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                log::warn!("Failed to read settings file: {}. Using defaults.", err);
                return Self::default();
            }
        };

        match serde_json::from_str::<AppSettings>(&content) {
            Ok(settings) => {
                if settings.validate().is_err() {
                    log::warn!("Invalid settings detected, using defaults for invalid values");
                    Self::sanitize_settings(settings)
                } else {
                    settings
                }
            }
            Err(err) => {
                log::warn!("Failed to parse settings file: {}. Using defaults.", err);
                Self::default()
            }
        }
    }

    /// Sanitize settings by correcting invalid values and providing feedback
    fn sanitize_settings(mut settings: AppSettings) -> Self {
        let mut all_corrections = Vec::new();

        if settings.audio.validate().is_err() {
            all_corrections.push("Audio settings were invalid and reset to defaults".to_string());
            settings.audio = AudioSettings::default();
        }

        all_corrections.extend(settings.ui.sanitize());

        if settings.metronome.validate().is_err() {
            let clamped = settings.metronome.initial_bpm.clamp(MIN_BPM, MAX_BPM);
            all_corrections.push(format!(
                "Initial BPM {} is out of range, changed to {}",
                settings.metronome.initial_bpm, clamped
            ));
            settings.metronome.initial_bpm = clamped;
        }

        for correction in all_corrections {
            log::warn!("Settings correction: {}", correction);
        }

        settings
    }

    /// Auto-save settings after changes (for immediate apply functionality)
    pub fn auto_save(&self) -> Result<()> {
        self.validate()?;
        self.save_to_file()
    }
}
