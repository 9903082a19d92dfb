mod app;
mod color;
mod state;
mod ui;

use app::PathwayExplorerApp;
use eframe::egui;
use pathway_explorer::config::AppConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::from_env();
    log::info!("Reading datasets from {}", config.data_dir.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Pathway Explorer",
        options,
        Box::new(move |_cc| Ok(Box::new(PathwayExplorerApp::new(config)))),
    )
}
