use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use eframe::egui;

use rusty_dos::app::RustyDosApp;
use rusty_dos::cli::{self, Cli};
use rusty_dos::session::Session;
use rusty_dos::settings::PlotSettings;

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = match &cli.settings {
        Some(path) => PlotSettings::load(path)?,
        None => PlotSettings::default(),
    };
    match cli.command {
        Some(command) => cli::run(command, settings),
        None => run_gui(settings),
    }
}

fn run_gui(settings: PlotSettings) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty DOS – Density of States Plotter",
        options,
        Box::new(move |cc| {
            // Finished loads wake the UI so they show without input events.
            let ctx = cc.egui_ctx.clone();
            let mut session = Session::with_loader(move || ctx.request_repaint())?;
            session.apply_settings(settings, Instant::now());
            Ok(Box::new(RustyDosApp::new(session)))
        }),
    )
    .map_err(|err| anyhow::anyhow!("viewer failed: {err}"))
}
