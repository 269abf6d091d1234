//! Cadence demo: a value bouncing between 0 and 1.
//!
//! The tick loop moves the value, the render loop shows it: as the window's
//! clear color on desktop, in the log when headless. Escape stops the run.

mod bounce;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use cadence_engine::device::GpuInit;
use cadence_engine::logging::{init_logging, LoggingConfig};
use cadence_engine::runtime::HostSetup;
use cadence_engine::{desktop, Runtime, Settings};
use clap::Parser;

use bounce::BounceApp;

#[derive(Parser)]
#[command(name = "cadence-demo")]
#[command(about = "Bouncing-value demo for the cadence runtime")]
struct Cli {
    /// Run without a window, logging frames instead of drawing them
    #[arg(long)]
    headless: bool,
    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Length of a headless run
    #[arg(long, default_value_t = 3)]
    seconds: u64,
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(LoggingConfig::verbose(cli.verbose));

    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    if cli.headless {
        run_headless(settings, Duration::from_secs(cli.seconds))
    } else {
        desktop::run_with(BounceApp::default(), settings, GpuInit::default())
            .context("desktop run failed")
    }
}

fn run_headless(settings: Settings, length: Duration) -> Result<()> {
    let mut runtime = Runtime::with_settings(BounceApp::default(), settings)?;
    let setup = HostSetup::headless(runtime.settings());
    runtime.start(setup)?;

    let state = runtime.wait_for(length);
    log::info!("headless run over ({state})");
    if let Some(sync) = runtime.sync() {
        log::info!("final value {:.3}", sync.lock().value);
    }

    runtime.dispose()?;
    Ok(())
}
