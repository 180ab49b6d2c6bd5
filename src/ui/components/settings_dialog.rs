use crate::audio::AudioEngine;
use crate::metronome::{MAX_BPM, MIN_BPM};
use crate::settings::{AppSettings, AudioSettings, MetronomeSettings, UISettings};
use eframe::egui;

/// Settings dialog component for managing application settings
#[derive(Clone)]
pub struct SettingsDialog {
    pub open: bool,
    settings: AppSettings,
    original_settings: AppSettings,
    selected_tab: SettingsTab,

    // UI state
    available_devices: Vec<String>,
    device_refresh_requested: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum SettingsTab {
    Audio,
    UI,
    Metronome,
}

impl SettingsDialog {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            open: false,
            original_settings: settings.clone(),
            settings,
            selected_tab: SettingsTab::Metronome,
            available_devices: Vec::new(),
            device_refresh_requested: true,
        }
    }

    /// Open the settings dialog
    pub fn open(&mut self) {
        self.open = true;
        self.original_settings = self.settings.clone();
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn get_settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Update the settings (for external changes)
    pub fn update_settings(&mut self, settings: AppSettings) {
        self.settings = settings;
    }

    /// Throw away edits made since the dialog was opened
    pub fn revert(&mut self) {
        self.settings = self.original_settings.clone();
    }

    pub fn request_device_refresh(&mut self) {
        self.device_refresh_requested = true;
    }

    fn refresh_devices(&mut self) {
        self.device_refresh_requested = false;
        self.available_devices = match AudioEngine::available_devices() {
            Ok(devices) => devices,
            Err(err) => {
                log::warn!("Failed to enumerate output devices: {}", err);
                Vec::new()
            }
        };
    }

    /// Show the settings dialog and return true if settings were changed.
    /// Changes apply immediately; Cancel restores what was there on open.
    pub fn show(&mut self, ctx: &egui::Context) -> bool {
        if !self.open {
            return false;
        }

        if self.device_refresh_requested {
            self.refresh_devices();
        }

        let mut settings_changed = false;
        let mut open = self.open;
        egui::Window::new("Settings")
            .open(&mut open)
            .default_size([420.0, 300.0])
            .resizable(true)
            .show(ctx, |ui| {
                settings_changed = self.show_content(ui);
            });

        self.open = open && self.open;
        settings_changed
    }

    fn show_content(&mut self, ui: &mut egui::Ui) -> bool {
        let mut settings_changed = false;

        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.selected_tab, SettingsTab::Metronome, "Metronome");
            ui.selectable_value(&mut self.selected_tab, SettingsTab::Audio, "Audio");
            ui.selectable_value(&mut self.selected_tab, SettingsTab::UI, "UI");
        });

        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| match self.selected_tab {
            SettingsTab::Audio => settings_changed = self.show_audio_settings(ui),
            SettingsTab::UI => settings_changed = self.show_ui_settings(ui),
            SettingsTab::Metronome => settings_changed = self.show_metronome_settings(ui),
        });

        ui.separator();

        ui.horizontal(|ui| {
            if ui.button("Reset to Defaults").clicked() {
                match self.selected_tab {
                    SettingsTab::Audio => self.settings.audio = AudioSettings::default(),
                    SettingsTab::UI => self.settings.ui = UISettings::default(),
                    SettingsTab::Metronome => self.settings.metronome = MetronomeSettings::default(),
                }
                settings_changed = true;
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Close").clicked() {
                    self.original_settings = self.settings.clone();
                    self.close();
                }

                if ui.button("Cancel").clicked() {
                    if self.settings != self.original_settings {
                        self.revert();
                        settings_changed = true;
                    }
                    self.close();
                }
            });
        });

        settings_changed
    }

    fn show_audio_settings(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;

        ui.heading("Audio Settings");
        ui.add_space(10.0);

        ui.horizontal(|ui| {
            ui.label("Output Device:");

            let selected = self
                .settings
                .audio
                .preferred_device
                .clone()
                .unwrap_or_else(|| "System Default".to_string());

            egui::ComboBox::from_id_source("output_device_combo")
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    if ui
                        .selectable_value(&mut self.settings.audio.preferred_device, None, "System Default")
                        .clicked()
                    {
                        changed = true;
                    }
                    for device in &self.available_devices {
                        if ui
                            .selectable_value(
                                &mut self.settings.audio.preferred_device,
                                Some(device.clone()),
                                device.as_str(),
                            )
                            .clicked()
                        {
                            changed = true;
                        }
                    }
                });

            if ui.small_button("🔄").on_hover_text("Refresh device list").clicked() {
                self.request_device_refresh();
            }
        });

        ui.add_space(10.0);

        ui.horizontal(|ui| {
            ui.label("Master Volume:");
            let response = ui.add(
                egui::Slider::new(&mut self.settings.audio.master_volume, 0.0..=2.0)
                    .custom_formatter(|n, _| format!("{:.0}%", n * 100.0)),
            );
            changed |= slider_committed(&response);
        });

        ui.add_space(10.0);

        ui.horizontal(|ui| {
            ui.label("Click Sound:");
            let label = self
                .settings
                .audio
                .click_sample
                .as_ref()
                .and_then(|path| path.file_name())
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| "Built-in".to_string());
            ui.monospace(label);

            if ui.button("Browse…").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("WAV audio", &["wav"])
                    .pick_file()
                {
                    self.settings.audio.click_sample = Some(path);
                    changed = true;
                }
            }

            if self.settings.audio.click_sample.is_some() && ui.button("Use Built-in").clicked() {
                self.settings.audio.click_sample = None;
                changed = true;
            }
        });

        changed
    }

    fn show_ui_settings(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;

        ui.heading("UI Settings");
        ui.add_space(10.0);

        ui.horizontal(|ui| {
            ui.label("Theme:");
            for (value, label) in [("dark", "Dark"), ("light", "Light"), ("auto", "Follow System")] {
                if ui
                    .selectable_value(&mut self.settings.ui.theme, value.to_string(), label)
                    .clicked()
                {
                    changed = true;
                }
            }
        });

        ui.add_space(10.0);

        ui.horizontal(|ui| {
            ui.label("UI Scale:");
            let response =
                ui.add(egui::Slider::new(&mut self.settings.ui.ui_scale, 0.5..=3.0).step_by(0.25));
            changed |= slider_committed(&response);
        });

        changed
    }

    fn show_metronome_settings(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;

        ui.heading("Metronome");
        ui.add_space(10.0);

        ui.horizontal(|ui| {
            ui.label("Starting tempo:");
            if ui
                .add(
                    egui::DragValue::new(&mut self.settings.metronome.initial_bpm)
                        .range(MIN_BPM..=MAX_BPM)
                        .suffix(" BPM"),
                )
                .changed()
            {
                changed = true;
            }
        });

        ui.add_space(6.0);

        changed |= ui
            .checkbox(&mut self.settings.metronome.keyboard_shortcuts, "Keyboard shortcuts")
            .on_hover_text("Space/Enter start or stop, arrow keys change the tempo")
            .changed();
        changed |= ui
            .checkbox(&mut self.settings.metronome.show_elapsed_time, "Show elapsed time")
            .changed();
        changed |= ui
            .checkbox(&mut self.settings.metronome.show_step_buttons, "Show −/+ tempo buttons")
            .changed();

        if self.settings.metronome.keyboard_shortcuts {
            ui.add_space(10.0);
            egui::Grid::new("shortcut_grid").num_columns(2).show(ui, |ui| {
                ui.label("Start / Stop:");
                ui.monospace("Space, Enter");
                ui.end_row();
                ui.label("Tempo +1:");
                ui.monospace("↑, →");
                ui.end_row();
                ui.label("Tempo −1:");
                ui.monospace("↓, ←");
                ui.end_row();
            });
        }

        changed
    }
}

/// A slider edit counts once the value settles: at the end of a drag, or
/// straight away for a track click or keyboard step.
fn slider_committed(response: &egui::Response) -> bool {
    edit_committed(response.changed(), response.dragged(), response.drag_stopped())
}

fn edit_committed(changed: bool, dragging: bool, drag_stopped: bool) -> bool {
    drag_stopped || (changed && !dragging)
}
