mod config;
mod core;
mod error;
mod logging;
mod style;
mod task;
mod types;
mod ui;

use eframe::egui;
use log::info;

use crate::config::AppConfig;

fn main() -> eframe::Result<()> {
    let log_path = logging::default_log_path();
    logging::initialize(Some(&log_path), logging::default_level());

    let config = AppConfig::load();
    info!(
        "Talk Cleaner v{} watching {:?}",
        env!("CARGO_PKG_VERSION"),
        config.received_dir()
    );

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Talk Cleaner",
        native_options,
        Box::new(move |cc| {
            style::install_fonts(&cc.egui_ctx);
            style::apply_theme(&cc.egui_ctx);
            Ok(Box::new(ui::TalkCleanerApp::new(config)))
        }),
    )
}
