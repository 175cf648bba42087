//! CLI command definitions
//!
//! Defines the clap commands for the hook harness CLI.

use clap::Subcommand;
use std::path::PathBuf;

use crate::common::config::MockMode;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the decision mock server
    Mock {
        /// Address to bind (default: 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default: 8000)
        #[arg(long, short)]
        port: Option<u16>,

        /// Response policy
        #[arg(long, value_enum)]
        mode: Option<MockMode>,

        /// Seed randomized reasons and rules for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run the capture-only server that records raw request bodies
    Capture {
        /// Address to bind (default: 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default: 8001)
        #[arg(long, short)]
        port: Option<u16>,

        /// File path where the request body is written
        #[arg(long)]
        capture_file: Option<PathBuf>,
    },

    /// Drive the client binary through fixture suites
    Run {
        /// Organization ID
        #[arg(long, env = "OID")]
        org_id: Option<String>,

        /// Secret ID
        #[arg(long, env = "SECRET_ID")]
        secret_id: Option<String>,

        /// Root directory containing the platform binaries
        #[arg(long = "bin", short = 'b')]
        bin: PathBuf,

        /// Fixture suite to run; repeat for several (default from config)
        #[arg(long = "suite", short = 's')]
        suites: Vec<String>,

        /// Directory holding one subdirectory per suite
        #[arg(long)]
        fixtures_root: Option<PathBuf>,

        /// Team URL template with {org_id} and {secret_id} placeholders
        #[arg(long)]
        team_url: Option<String>,
    },
}
