use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod action;
mod cli;
mod config;
mod controller;
mod herd;
mod interactive;
mod log;
mod orchestrator;
mod report;
mod rows;
mod summary;

use cli::RootArgs;
use config::{ConfigOverrides, RunConfig};
use controller::HerdController;
use log::TracingLog;
use orchestrator::Orchestrator;

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);
    tracing::info!("Loading Application");

    let mut overrides = ConfigOverrides {
        action: args.action.clone(),
        rows_file: args.rows.clone(),
        password: None,
    };
    let gui_enabled = if args.console {
        tracing::info!("Command Line Mode");
        false
    } else {
        tracing::info!("Interactive Mode");
        let stdin = std::io::stdin();
        let mut stderr = std::io::stderr();
        overrides = interactive::prompt_overrides(&mut stdin.lock(), &mut stderr, overrides)?;
        true
    };

    let mut controller = HerdController::new(args.config.clone(), overrides);
    let log = TracingLog;
    let outcome = Orchestrator::new(&mut controller, &log, RunConfig { gui_enabled })
        .with_summary_out(args.summary_out.clone())
        .run();
    tracing::debug!(
        final_state = %outcome.final_state(),
        clean = outcome.is_clean(),
        "run finished"
    );
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
