//! Erst CLI
//!
//! Runs transaction simulations as background jobs and lets the user poll,
//! wait on, or discard them.

mod commands;
mod config;
mod display;
mod id_resolver;
mod runner;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use erst_scheduler::SchedulerConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "erst")]
#[command(about = "Erst - Soroban Error Decoder & Debugger", long_about = None)]
struct Cli {
    /// Simulator executable
    #[arg(long, env = "ERST_SIMULATOR", default_value = "erst-sim")]
    simulator: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "erst=warn,erst_scheduler=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        simulator: cli.simulator,
        scheduler: SchedulerConfig::from_env().context("Invalid scheduler configuration")?,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let result = runtime.block_on(handle_command(cli.command, &config));

    // Simulations still in flight are abandoned rather than waited on
    runtime.shutdown_background();

    result
}
