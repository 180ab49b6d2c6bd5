use eframe::egui;

mod audio;
mod metronome;
mod settings;
mod ui;

use settings::AppSettings;
use ui::MetronomeApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let settings = AppSettings::load_from_file();
    log::info!(
        "Starting at {} BPM (shortcuts: {}, elapsed time: {}, step buttons: {})",
        settings.metronome.initial_bpm,
        settings.metronome.keyboard_shortcuts,
        settings.metronome.show_elapsed_time,
        settings.metronome.show_step_buttons
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 440.0])
            .with_min_inner_size([320.0, 360.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "Ticktock - Metronome",
        options,
        Box::new(|cc| Ok(Box::new(MetronomeApp::new(cc, settings)))),
    )
}
