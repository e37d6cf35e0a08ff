mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use clap::Parser;
use controller::events::UiEvent;
use crossbeam_channel::bounded;
use eframe::egui;
use ui::{StartupConfig, StudioApp};

#[derive(Parser, Debug)]
#[command(
    name = "studio_desktop_gui",
    about = "Desktop front-end for the AI cinematic studio"
)]
struct Cli {
    /// Base URL of the studio generation server.
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    server_url: String,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::start_backend_bridge(cli.server_url.clone(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("AI Cinematic Studio")
            .with_inner_size([1180.0, 760.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "AI Cinematic Studio",
        options,
        Box::new(|_cc| {
            Ok(Box::new(StudioApp::new(
                cmd_tx,
                ui_rx,
                StartupConfig {
                    server_url: cli.server_url,
                },
            )))
        }),
    )
}
