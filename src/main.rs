mod app;
mod color;
mod config;
mod data;
mod forecast;
mod state;
mod stats;
mod ui;

use std::path::PathBuf;

use app::FuelDashboardApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load();
    let csv = config.startup_csv(std::env::args_os().nth(1).map(PathBuf::from));
    if let Some(path) = &csv {
        log::info!("Opening {} at startup", path.display());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Combustibles – Importación y consumo",
        options,
        Box::new(move |_cc| Ok(Box::new(FuelDashboardApp::new(&config, csv)))),
    )
}
