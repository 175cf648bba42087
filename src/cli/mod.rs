//! CLI command handling
//!
//! Resolves command-line overrides against the loaded configuration and
//! runs the selected server or scenario.

use std::path::PathBuf;

use colored::Colorize;

use crate::capture::CaptureServer;
use crate::commands::Commands;
use crate::common::config::{expand_team_url, Config};
use crate::common::handle::ServerHandle;
use crate::common::{platform, Error, Result};
use crate::mock::MockServer;
use crate::testing::{ScenarioRunner, SuiteSummary};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, mut config: Config) -> Result<()> {
    match command {
        Commands::Mock {
            host,
            port,
            mode,
            seed,
        } => {
            let mock = &mut config.mock;
            if let Some(host) = host {
                mock.host = host;
            }
            if let Some(port) = port {
                mock.port = port;
            }
            if let Some(mode) = mode {
                mock.mode = mode;
            }
            if seed.is_some() {
                mock.seed = seed;
            }

            let handle = MockServer::from_config(mock).spawn(&mock.host, mock.port).await?;
            println!("Starting mock server on {}", handle.url(""));
            println!("Mode: {:?}", mock.mode);
            serve_until_interrupted(handle).await
        }

        Commands::Capture {
            host,
            port,
            capture_file,
        } => {
            let capture = &mut config.capture;
            if let Some(host) = host {
                capture.host = host;
            }
            if let Some(port) = port {
                capture.port = port;
            }
            let capture_file = capture_file
                .or_else(|| capture.file.clone())
                .ok_or_else(|| Error::Config("--capture-file required".to_string()))?;

            let server = CaptureServer::new(capture_file);
            tracing::debug!(path = %server.capture_file().display(), "Capture target");

            let handle = server.spawn(&capture.host, capture.port).await?;
            serve_until_interrupted(handle).await
        }

        Commands::Run {
            org_id,
            secret_id,
            bin,
            suites,
            fixtures_root,
            team_url,
        } => {
            let args = RunArgs {
                org_id,
                secret_id,
                bin,
                suites,
                fixtures_root,
                team_url,
            };

            tokio::select! {
                result = run_scenarios(args, &config) => result,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted, stopping scenario run");
                    Ok(())
                }
            }
        }
    }
}

/// Serve until the task ends or the operator presses Ctrl-C
async fn serve_until_interrupted(mut handle: ServerHandle) -> Result<()> {
    tokio::select! {
        result = handle.wait() => return result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl-C, shutting down");
        }
    }
    handle.shutdown().await
}

struct RunArgs {
    org_id: Option<String>,
    secret_id: Option<String>,
    bin: PathBuf,
    suites: Vec<String>,
    fixtures_root: Option<PathBuf>,
    team_url: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

async fn run_scenarios(args: RunArgs, config: &Config) -> Result<()> {
    let scenario = &config.scenario;
    let binary = platform::resolve_binary(&args.bin, &scenario.binary_prefix)?;

    let (org_id, secret_id) = match (non_empty(args.org_id), non_empty(args.secret_id)) {
        (Some(org_id), Some(secret_id)) => (org_id, secret_id),
        _ => return Err(Error::Config("--org-id and --secret-id required".to_string())),
    };

    let runner = ScenarioRunner::new(&binary).callback_subcommand(&scenario.callback_subcommand);

    let template = args.team_url.as_deref().unwrap_or(&scenario.team_url);
    let team_url = expand_team_url(template, &org_id, &secret_id);
    runner
        .setup(&[scenario.setup_subcommand.as_str(), team_url.as_str()])
        .await?;

    let suites = if args.suites.is_empty() {
        scenario.suites.clone()
    } else {
        args.suites
    };
    let fixtures_root = args
        .fixtures_root
        .unwrap_or_else(|| scenario.fixtures_root.clone());

    let mut out = std::io::stdout();
    for suite in &suites {
        let results = runner.run_suite(&fixtures_root.join(suite), &mut out).await?;
        let summary = SuiteSummary::from_results(&results);
        if summary.errors() == 0 {
            println!("  {} {}", "✓".green(), summary.to_string().dimmed());
        } else {
            println!("  {} {}", "✗".yellow(), summary.to_string().dimmed());
        }
    }

    Ok(())
}
