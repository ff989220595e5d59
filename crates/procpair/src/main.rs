use anyhow::{Context, Result};
use clap::Parser;
use procpair::cli::{Cli, Command};
use procpair::{ProcPair, Role, logging};
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // Usage errors exit 1; --help and --version are successful runs
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    logging::init(cli.json_logs);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "procpair failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let pair = ProcPair::new(cli.supervisor_config()?);

    match cli.command {
        Command::StartMonitor { partner } => pair.supervise(Role::Monitor, partner).await,
        Command::StartWorker { partner } => pair.supervise(Role::Worker, partner).await,
        Command::Stop => {
            let report = pair
                .stop()
                .await
                .context("Failed to create stop signal file")?;
            info!(
                signalled = report.signalled.len(),
                already_gone = report.not_found.len(),
                failed = report.failed.len(),
                "Stop requested"
            );
            Ok(())
        }
        Command::Status => {
            let status = pair.status().context("Failed to read pid registry")?;
            println!(
                "stop signal: {}",
                if status.stop_requested { "present" } else { "absent" }
            );
            for entry in status.entries {
                let state = if entry.alive { "alive" } else { "dead" };
                println!("{}\t{state}", entry.pid);
            }
            Ok(())
        }
        Command::Prune => {
            let removed = pair.prune().context("Failed to prune pid registry")?;
            info!(removed = ?removed, "Pruned pid registry");
            Ok(())
        }
    }
}
