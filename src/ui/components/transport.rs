use eframe::egui;
use std::time::Instant;

use crate::metronome::Metronome;

pub struct TransportControls;

impl TransportControls {
    /// Start and Stop buttons, each disabled while it would be a no-op.
    pub fn show(ui: &mut egui::Ui, metronome: &mut Metronome) -> bool {
        let mut state_changed = false;

        ui.horizontal(|ui| {
            let is_running = metronome.is_running();

            if ui
                .add_enabled(!is_running, egui::Button::new("▶ Start").min_size(egui::vec2(90.0, 32.0)))
                .clicked()
            {
                metronome.start(Instant::now());
                state_changed = true;
            }

            if ui
                .add_enabled(is_running, egui::Button::new("⏹ Stop").min_size(egui::vec2(90.0, 32.0)))
                .clicked()
            {
                metronome.stop();
                state_changed = true;
            }
        });

        state_changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentPlayer;
    use crate::metronome::TempoCell;

    #[test]
    fn test_untouched_buttons_leave_state_alone() {
        let ctx = egui::Context::default();
        let mut metronome = Metronome::new(TempoCell::new(60), Box::new(SilentPlayer));

        let mut changed = true;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                changed = TransportControls::show(ui, &mut metronome);
            });
        });

        assert!(!changed);
        assert!(!metronome.is_running());
    }
}
