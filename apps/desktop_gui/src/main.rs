mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use country_core::config::{load_settings, normalize_api_base_url};
use crossbeam_channel::bounded;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::CountryExplorerApp;

#[derive(Parser, Debug)]
#[command(about = "Browse, search and page through the world's countries")]
struct Args {
    /// Overrides the configured API base URL.
    #[arg(long)]
    api_base_url: Option<String>,
    #[arg(long, default_value = "info")]
    log_filter: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_filter)),
        )
        .init();

    let mut settings = load_settings();
    if let Some(url) = &args.api_base_url {
        settings.api_base_url = url.clone();
    }
    settings.api_base_url = normalize_api_base_url(&settings.api_base_url)?;
    tracing::info!(api_base_url = %settings.api_base_url, "starting country explorer");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(1024);
    let api_base_url = settings.api_base_url.clone();
    backend_bridge::runtime::launch(cmd_rx, ui_tx, settings);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Country Explorer")
            .with_inner_size([1100.0, 780.0])
            .with_min_inner_size([560.0, 420.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Country Explorer",
        options,
        Box::new(|_cc| {
            Ok(Box::new(CountryExplorerApp::new(
                cmd_tx,
                ui_rx,
                api_base_url,
            )))
        }),
    )
    .map_err(|err| anyhow::anyhow!("failed to run desktop window: {err}"))
}
