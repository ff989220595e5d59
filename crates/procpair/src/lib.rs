//! procpair - a self-healing monitor/worker process pair
//!
//! Two processes watch each other: whichever finds its partner gone starts a
//! new one. They coordinate only through two files, a pid registry and a stop
//! signal file, so `procpair stop` can bring down a pair it never spawned.
//!
//! [`ProcPair`] wires the platform process manager and registry lock into the
//! core supervisor; the `procpair` binary is a thin CLI over it.

pub mod cli;
mod factory;
pub mod logging;
mod paths;

pub use factory::{
    PlatformProcessManager, PlatformProcessManagerFactory, platform_registry_locker,
    termination_signal,
};
pub use paths::{default_registry_path, default_sentinel_path};

// Re-export core functionality
pub use procpair_core::*;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Liveness of one registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PidStatus {
    pub pid: ProcessId,
    pub alive: bool,
}

/// Snapshot of the shared coordination state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairStatus {
    pub stop_requested: bool,
    pub entries: Vec<PidStatus>,
}

/// A process pair bound to one registry and one stop signal file
pub struct ProcPair {
    config: SupervisorConfig,
    manager: Arc<PlatformProcessManager>,
    registry: PidRegistry,
    sentinel: ShutdownSentinel,
}

impl ProcPair {
    pub fn new(config: SupervisorConfig) -> Self {
        info!(
            platform = PlatformProcessManagerFactory::platform_name(),
            registry = %config.registry_path.display(),
            sentinel = %config.sentinel_path.display(),
            "Using coordination files"
        );
        Self {
            manager: Arc::new(PlatformProcessManagerFactory::create_process_manager()),
            registry: PidRegistry::new(&config.registry_path, platform_registry_locker()),
            sentinel: ShutdownSentinel::new(&config.sentinel_path),
            config,
        }
    }

    pub fn registry(&self) -> &PidRegistry {
        &self.registry
    }

    /// Run as `role` until a stop is requested.
    ///
    /// A termination signal counts as a requested stop.
    pub async fn supervise(&self, role: Role, partner: Option<ProcessId>) -> Result<()> {
        let shutdown =
            termination_signal().context("Failed to install termination signal handler")?;
        let supervisor = Supervisor::new(
            role,
            self.config.clone(),
            self.manager.clone(),
            self.registry.clone(),
        );
        supervisor.run(partner, shutdown).await?;
        Ok(())
    }

    /// Create the stop signal file and terminate every registered process
    pub async fn stop(&self) -> Result<StopReport, SentinelError> {
        stop(&self.sentinel, &self.registry, self.manager.as_ref()).await
    }

    pub fn status(&self) -> Result<PairStatus, RegistryError> {
        let entries = self
            .registry
            .load()?
            .into_iter()
            .map(|pid| PidStatus {
                pid,
                alive: self.manager.is_alive(pid),
            })
            .collect();
        Ok(PairStatus {
            stop_requested: self.sentinel.exists(),
            entries,
        })
    }

    /// Drop registry entries whose process has exited
    pub fn prune(&self) -> Result<Vec<ProcessId>, RegistryError> {
        self.registry.prune(|pid| self.manager.is_alive(pid))
    }
}
