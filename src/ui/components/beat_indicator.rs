use eframe::egui;

use crate::metronome::BEATS_PER_MEASURE;

const DOT_RADIUS: f32 = 12.0;
const DOT_SPACING: f32 = 24.0;

pub struct BeatIndicator;

impl BeatIndicator {
    /// One dot per beat of the measure, the current beat drawn large and bright.
    pub fn show(ui: &mut egui::Ui, current_beat: usize) {
        let width = BEATS_PER_MEASURE as f32 * (DOT_RADIUS * 3.0) + (BEATS_PER_MEASURE - 1) as f32 * DOT_SPACING;
        let height = DOT_RADIUS * 3.5;

        ui.vertical_centered(|ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(width, height), egui::Sense::hover());
            let painter = ui.painter_at(rect);

            for beat in 0..BEATS_PER_MEASURE {
                let active = beat == current_beat;
                let center = egui::pos2(
                    rect.left() + DOT_RADIUS * 1.5 + beat as f32 * (DOT_RADIUS * 3.0 + DOT_SPACING),
                    rect.center().y,
                );

                if active {
                    painter.circle_filled(center, DOT_RADIUS * 1.5, egui::Color32::from_rgb(192, 132, 252));
                } else {
                    painter.circle_filled(
                        center,
                        DOT_RADIUS,
                        egui::Color32::from_rgba_unmultiplied(216, 180, 254, 110),
                    );
                }
            }
        });
    }
}
