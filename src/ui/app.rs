use super::components::{
    BeatIndicator, ElapsedDisplay, SettingsDialog, TempoControl, TransportControls,
};
use super::keyboard;
use crate::audio::{AudioEngine, ClickPlayer, SilentPlayer};
use crate::metronome::{Metronome, TempoCell};
use crate::settings::AppSettings;
use eframe::egui;
use std::time::{Duration, Instant};

/// Upper bound on how long the UI sleeps while running, so the elapsed
/// clock and the beat dots never lag far behind even if no timer is close.
const MAX_IDLE_REPAINT: Duration = Duration::from_millis(250);

pub struct MetronomeApp {
    metronome: Metronome,
    settings: AppSettings,
    settings_dialog: SettingsDialog,
    error_message: Option<String>,
    resolved_theme: String,
}

impl MetronomeApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: AppSettings) -> Self {
        let (player, error_message) = open_audio(&settings);
        let tempo = TempoCell::new(settings.metronome.initial_bpm);

        cc.egui_ctx.set_zoom_factor(settings.ui.ui_scale);

        MetronomeApp {
            metronome: Metronome::new(tempo, player),
            settings_dialog: SettingsDialog::new(settings.clone()),
            resolved_theme: settings.ui.resolve_theme(),
            settings,
            error_message,
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        if !self.settings.metronome.keyboard_shortcuts
            || self.settings_dialog.is_open()
            || ctx.wants_keyboard_input()
        {
            return;
        }

        let now = Instant::now();
        for action in keyboard::take_actions(ctx) {
            keyboard::apply(action, &mut self.metronome, now);
        }
    }

    fn apply_settings(&mut self, ctx: &egui::Context, new_settings: AppSettings) {
        if self.settings.audio.requires_reopen(&new_settings.audio) {
            let (player, error_message) = open_audio(&new_settings);
            self.metronome.replace_player(player);
            self.error_message = error_message;
        } else if new_settings.audio.master_volume != self.settings.audio.master_volume {
            self.metronome.set_click_volume(new_settings.audio.master_volume);
        }

        if new_settings.ui.ui_scale != self.settings.ui.ui_scale {
            ctx.set_zoom_factor(new_settings.ui.ui_scale);
        }
        self.resolved_theme = new_settings.ui.resolve_theme();

        self.settings = new_settings;
        if let Err(err) = self.settings.auto_save() {
            log::warn!("Failed to save settings: {}", err);
        }
    }
}

/// Open the configured output, falling back to a silent player so the
/// metronome still runs visually without audio.
fn open_audio(settings: &AppSettings) -> (Box<dyn ClickPlayer>, Option<String>) {
    match AudioEngine::new(&settings.audio) {
        Ok(engine) => {
            log::info!(
                "Audio output: {} ({} Hz)",
                engine.device_name(),
                engine.sample_rate()
            );
            (Box::new(engine), None)
        }
        Err(e) => {
            log::error!("Failed to initialize audio: {}", e);
            (
                Box::new(SilentPlayer),
                Some(format!("Failed to initialize audio: {}", e)),
            )
        }
    }
}

impl eframe::App for MetronomeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keyboard(ctx);
        self.metronome.pump(Instant::now());

        if self.resolved_theme == "light" {
            ctx.set_visuals(egui::Visuals::light());
        } else {
            ctx.set_visuals(egui::Visuals::dark());
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("🎵 Metronome");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("⚙").on_hover_text("Settings").clicked() {
                        self.settings_dialog.update_settings(self.settings.clone());
                        self.settings_dialog.open();
                    }
                });
            });

            ui.add_space(8.0);

            if let Some(ref error) = self.error_message {
                egui::Frame::none()
                    .fill(egui::Color32::from_rgb(60, 20, 20))
                    .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(120, 40, 40)))
                    .inner_margin(egui::Margin::same(8.0))
                    .show(ui, |ui| {
                        ui.colored_label(egui::Color32::from_rgb(255, 100, 100), format!("⚠ {}", error));
                    });
                ui.add_space(8.0);
            } else if self.metronome.failed_playbacks() > 0 {
                ui.small(format!(
                    "⚠ {} clicks could not be played, see the log for details",
                    self.metronome.failed_playbacks()
                ));
                ui.add_space(8.0);
            }

            egui::Frame::group(ui.style())
                .inner_margin(egui::Margin::symmetric(16.0, 16.0))
                .show(ui, |ui| {
                    BeatIndicator::show(ui, self.metronome.current_beat());
                    ui.add_space(12.0);

                    if self.settings.metronome.show_elapsed_time {
                        ElapsedDisplay::show(ui, self.metronome.elapsed());
                        ui.add_space(8.0);
                    }

                    let transport_changed = ui
                        .vertical_centered(|ui| TransportControls::show(ui, &mut self.metronome))
                        .inner;
                    ui.add_space(12.0);

                    let tempo_changed = TempoControl::show(
                        ui,
                        &mut self.metronome,
                        self.settings.metronome.show_step_buttons,
                    );

                    // Redraw so the new state and next deadline show up at once.
                    if transport_changed || tempo_changed {
                        ui.ctx().request_repaint();
                    }
                });

            if self.settings.metronome.keyboard_shortcuts {
                ui.add_space(8.0);
                ui.small("💡 Space/Enter start or stop • ↑/→ faster • ↓/← slower");
            }
        });

        if self.settings_dialog.show(ctx) {
            let new_settings = self.settings_dialog.get_settings().clone();
            self.apply_settings(ctx, new_settings);
        }

        if self.metronome.is_running() {
            let wait = self
                .metronome
                .time_until_next(Instant::now())
                .unwrap_or(MAX_IDLE_REPAINT)
                .min(MAX_IDLE_REPAINT);
            ctx.request_repaint_after(wait);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.metronome.stop();
    }
}
