mod app;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use app::RustyGridApp;
use clap::Parser;
use eframe::egui;
use rusty_grid::config::ViewerConfig;
use rusty_grid::remote::PageRequest;

/// Browse, filter, sort and export tabular data.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// File to open at start-up (csv, json, xlsx/xls/ods, parquet).
    file: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the remote page source, overriding the config file.
    #[arg(long)]
    api_url: Option<String>,

    /// Fetch the first remote page at start-up.
    #[arg(long, conflicts_with = "file")]
    remote: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = ViewerConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        config.remote.base_url = url;
    }
    log::debug!("configuration: {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let startup_file = cli.file;
    let startup_remote = cli.remote;
    eframe::run_native(
        "Rusty Grid – Table Viewer",
        options,
        Box::new(move |cc| {
            let mut app = RustyGridApp::new(config);
            if let Some(path) = startup_file {
                app.state.open_path(&cc.egui_ctx, path);
            } else if startup_remote {
                let limit = app.state.view.page_state().page_size();
                app.state
                    .fetch_remote(&cc.egui_ctx, PageRequest { page: 1, limit }, false);
            }
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow!("{e}"))
}
