//! Command-line interface definition.

use crate::paths::{default_registry_path, default_sentinel_path};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use procpair_core::{ProcessId, SupervisorConfig};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "procpair")]
#[command(about = "Self-healing monitor/worker process pair")]
#[command(version)]
pub struct Cli {
    /// Pid registry file shared by every member of the pair
    #[arg(long, global = true, env = "PROCPAIR_REGISTRY", default_value_os_t = default_registry_path())]
    pub registry: PathBuf,

    /// Stop signal file; its presence makes every member exit
    #[arg(long, global = true, env = "PROCPAIR_SENTINEL", default_value_os_t = default_sentinel_path())]
    pub sentinel: PathBuf,

    /// How often the partner and the stop signal file are checked
    #[arg(long, global = true, default_value_t = 1_000, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_ms: u64,

    /// How often a running member re-registers its pid
    #[arg(long, global = true, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub heartbeat_interval_secs: u64,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the monitor, starting a worker unless one is given
    StartMonitor {
        /// Pid of an already running worker
        #[arg(value_name = "PARTNER_PID")]
        partner: Option<ProcessId>,
    },
    /// Run the worker, starting a monitor unless one is given
    StartWorker {
        /// Pid of an already running monitor
        #[arg(value_name = "PARTNER_PID")]
        partner: Option<ProcessId>,
    },
    /// Create the stop signal file and terminate every registered process
    Stop,
    /// Show the stop signal state and the liveness of registered pids
    Status,
    /// Remove pids of exited processes from the registry
    Prune,
}

impl Cli {
    /// Options a spawned counterpart needs to join the same pair
    pub fn forwarded_args(&self) -> Vec<String> {
        let mut args = vec![
            "--registry".to_string(),
            self.registry.display().to_string(),
            "--sentinel".to_string(),
            self.sentinel.display().to_string(),
            "--poll-interval-ms".to_string(),
            self.poll_interval_ms.to_string(),
            "--heartbeat-interval-secs".to_string(),
            self.heartbeat_interval_secs.to_string(),
        ];
        if self.json_logs {
            args.push("--json-logs".to_string());
        }
        args
    }

    pub fn supervisor_config(&self) -> Result<SupervisorConfig> {
        let executable =
            std::env::current_exe().context("Failed to locate the procpair executable")?;
        SupervisorConfig::builder()
            .registry_path(self.registry.clone())
            .sentinel_path(self.sentinel.clone())
            .executable(executable)
            .forwarded_args(self.forwarded_args())
            .poll_interval(Duration::from_millis(self.poll_interval_ms))
            .heartbeat_interval(Duration::from_secs(self.heartbeat_interval_secs))
            .build()
            .context("Invalid supervisor configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_partner_pid_is_optional() {
        let cli = Cli::try_parse_from(["procpair", "start-monitor"]).unwrap();
        assert_eq!(cli.command, Command::StartMonitor { partner: None });

        let cli = Cli::try_parse_from(["procpair", "start-worker", "4242"]).unwrap();
        assert_eq!(
            cli.command,
            Command::StartWorker {
                partner: Some(ProcessId(4242))
            }
        );
    }

    #[test]
    fn test_invalid_partner_pid_is_rejected() {
        for bad in ["abc", "0", "-5", "4.2"] {
            let error = Cli::try_parse_from(["procpair", "start-worker", bad]).unwrap_err();
            assert!(error.use_stderr(), "{bad} should be a usage error");
        }
    }

    #[test]
    fn test_help_is_not_an_error() {
        let error = Cli::try_parse_from(["procpair", "--help"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DisplayHelp);
        assert!(!error.use_stderr());
    }

    #[test]
    fn test_global_options_round_trip_through_forwarded_args() {
        let cli = Cli::try_parse_from([
            "procpair",
            "--registry",
            "/var/run/pids",
            "start-monitor",
            "--poll-interval-ms",
            "250",
            "--json-logs",
        ])
        .unwrap();
        assert_eq!(cli.registry, PathBuf::from("/var/run/pids"));
        assert_eq!(cli.poll_interval_ms, 250);

        let mut argv = vec!["procpair".to_string()];
        argv.extend(cli.forwarded_args());
        argv.push("start-worker".to_string());
        argv.push("99".to_string());
        let child = Cli::try_parse_from(argv).unwrap();

        assert_eq!(child.registry, cli.registry);
        assert_eq!(child.sentinel, cli.sentinel);
        assert_eq!(child.poll_interval_ms, 250);
        assert!(child.json_logs);
        assert_eq!(
            child.command,
            Command::StartWorker {
                partner: Some(ProcessId(99))
            }
        );
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        assert!(Cli::try_parse_from(["procpair", "--poll-interval-ms", "0", "stop"]).is_err());
    }

    #[test]
    fn test_supervisor_config_uses_options() {
        let cli = Cli::try_parse_from([
            "procpair",
            "--sentinel",
            "/var/run/stop",
            "--heartbeat-interval-secs",
            "5",
            "stop",
        ])
        .unwrap();
        let config = cli.supervisor_config().unwrap();
        assert_eq!(config.sentinel_path, PathBuf::from("/var/run/stop"));
        assert_eq!(config.heartbeat_interval, Duration::from_secs(5));
        assert_eq!(config.forwarded_args, cli.forwarded_args());
    }
}
