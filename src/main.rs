//! Hook Harness - mock decision backends and scenario runner
//!
//! Serves mock authorization/notification endpoints for a hook policy
//! client and drives the client binary through stored hook payloads.

use std::path::PathBuf;

use clap::Parser;
use hook_harness::common::{config::Config, logging};
use hook_harness::{cli, commands::Commands};

#[derive(Parser)]
#[command(name = "hook-harness", about = "Test harness for hook policy clients")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging for this crate
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.verbose);

    let result = match Config::load(cli.config.as_deref()) {
        Ok(config) => cli::dispatch(cli.command, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
