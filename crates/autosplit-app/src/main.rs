//! Autosplit - split long recordings into tracks at their silent gaps
//!
//! Entry point: logging, settings and the eframe window.

mod app;
mod jobs;
mod settings;

use anyhow::Result;
use app::AutosplitApp;
use eframe::egui;
use settings::Settings;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Autosplit starting...");

    let settings_path = Settings::default_path();
    let settings = Settings::load_or_default(&settings_path);

    // Optional audio file on the command line
    let audio_path = std::env::args().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([720.0, 400.0])
            .with_title("Autosplit"),
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };

    eframe::run_native(
        "Autosplit",
        options,
        Box::new(move |cc| {
            Ok(Box::new(AutosplitApp::new(
                cc,
                settings,
                settings_path,
                audio_path,
            )))
        }),
    )?;

    Ok(())
}
