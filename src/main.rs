mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;

use app::TrendsApp;
use ionic_trends::config::DashboardConfig;
use state::AppState;

/// Publication trends dashboard for ionic liquid research.
#[derive(Parser, Debug)]
#[command(name = "ionic-trends", version, about)]
struct Cli {
    /// Publication table (.csv, .json or .parquet); overrides `data_path` in the config
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = DashboardConfig::load_or_default(cli.config.as_deref())?;
    if let Some(data) = cli.data {
        config.data_path = data;
    }

    // The dashboard has nothing to show without a valid dataset.
    let data_path = config.data_path.clone();
    let mut state = AppState::new(config);
    state
        .open(&data_path)
        .context("cannot start without a valid dataset")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Publication Trends Analysis",
        options,
        Box::new(move |_cc| Ok(Box::new(TrendsApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running UI: {e}"))
}
