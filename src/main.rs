mod app;
mod cli;
mod color;
mod config;
mod data;
mod reactive;
mod sinks;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::Context;
use app::PenguinLensApp;
use clap::Parser;
use eframe::egui;

use crate::cli::Cli;
use crate::config::Config;
use crate::state::Session;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose);

    let mut config = Config::discover(cli.config.as_deref())?;
    if let Some(path) = cli.data {
        config.data.path = path;
    }

    // Loaded once, before any session exists; shared read-only afterwards.
    let dataset = data::loader::load_file(&config.data.path)
        .inspect_err(|e| log::error!("Failed to load dataset: {e}"))
        .with_context(|| {
            format!(
                "loading {} (generate one with `cargo run --bin generate_sample`)",
                config.data.path.display()
            )
        })?;
    let dataset = Arc::new(dataset);
    log::info!(
        "Dataset ready: {} rows across islands {:?}",
        dataset.len(),
        dataset.islands
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let session = Session::new(dataset, &config);
    eframe::run_native(
        "Penguin Lens – Palmer Penguins",
        options,
        Box::new(|_cc| Ok(Box::new(PenguinLensApp::new(session)))),
    )
    .map_err(|e| anyhow::anyhow!("UI error: {e}"))
}
