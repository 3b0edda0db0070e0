//! CLI argument parsing for the content loader.
//!
//! Without `--console` the loader prompts for the action and rows file before
//! running; with it the run uses the config file plus flags only.
use clap::Parser;
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "herdcl",
    version,
    about = "Batch content loader for the herd metadata service",
    after_help = "Examples:\n  herdcl --console --config ~/.config/herdcl/config.json\n  herdcl -c --action check --rows rows.json\n  herdcl --console --summary-out run-summary.json\n\nEvery run exits 0; read the report for the outcome."
)]
pub struct RootArgs {
    /// Command line mode: run headless without prompting
    #[arg(short = 'c', long)]
    pub console: bool,

    /// Loader config JSON (defaults to $HERDCL_CONFIG, then the user config dir)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Action to run, overriding the config file
    #[arg(long, value_name = "NAME")]
    pub action: Option<String>,

    /// Rows file, overriding the config file
    #[arg(long, value_name = "PATH")]
    pub rows: Option<PathBuf>,

    /// Also write the run summary as JSON
    #[arg(long, value_name = "PATH")]
    pub summary_out: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long)]
    pub verbose: bool,
}
