use eframe::egui;

use crate::metronome::{Metronome, MAX_BPM, MIN_BPM};

pub struct TempoControl;

impl TempoControl {
    /// BPM readout, the 30–240 slider and optionally the −/+ step buttons.
    pub fn show(ui: &mut egui::Ui, metronome: &mut Metronome, step_buttons: bool) -> bool {
        let mut changed = false;
        let mut bpm = metronome.bpm();

        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new(format!("BPM: {}", bpm)).strong());
        });

        ui.horizontal(|ui| {
            if step_buttons && ui.button("−").on_hover_text("Slower").clicked() {
                metronome.decrement_bpm();
                changed = true;
            }

            let width = ui.available_width() - if step_buttons { 30.0 } else { 0.0 };
            ui.spacing_mut().slider_width = width.max(80.0);
            if ui
                .add(egui::Slider::new(&mut bpm, MIN_BPM..=MAX_BPM).show_value(false))
                .changed()
            {
                metronome.set_bpm(bpm as i64);
                changed = true;
            }

            if step_buttons && ui.button("+").on_hover_text("Faster").clicked() {
                metronome.increment_bpm();
                changed = true;
            }
        });

        ui.horizontal(|ui| {
            ui.small(MIN_BPM.to_string());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.small(MAX_BPM.to_string());
            });
        });

        changed
    }
}
