use eframe::egui;

use crate::metronome::ElapsedTime;

pub struct ElapsedDisplay;

impl ElapsedDisplay {
    pub fn show(ui: &mut egui::Ui, elapsed: ElapsedTime) {
        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new(elapsed.display()).monospace().size(20.0));
        });
    }
}
