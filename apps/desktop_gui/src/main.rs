mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::DEFAULT_SERVER_URL;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::{
    backend_bridge::{commands::BackendCommand, runtime},
    controller::events::UiEvent,
    ui::DesktopGuiApp,
};

#[derive(Debug, Parser)]
#[command(name = "desktop_gui", about = "Desktop manager for job postings")]
struct Args {
    /// Base URL of the listing service.
    #[arg(long, env = "JOBS_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    server_url: String,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    runtime::launch(args.server_url.clone(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Job Listings")
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([820.0, 520.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Job Listings",
        options,
        Box::new(move |_cc| Ok(Box::new(DesktopGuiApp::new(cmd_tx, ui_rx, args.server_url)))),
    )
}
