use crate::config::SupervisorConfig;
use crate::error::SupervisorError;
use crate::process::{ProcessHandle, ProcessId, ProcessManager, Role};
use crate::registry::PidRegistry;
use crate::respawn::{RespawnDecision, RespawnPolicy};
use crate::sentinel::ShutdownSentinel;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Outcome of one pass of the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Shutdown,
}

/// One half of a monitor/worker pair.
///
/// Keeps its counterpart alive, re-registers itself on a heartbeat, and exits
/// once the shutdown sentinel shows up. The partner pid is only a lookup key;
/// when this supervisor spawned the partner itself, the reaped exit of the
/// child handle decides liveness instead of a pid lookup.
pub struct Supervisor<M: ProcessManager> {
    role: Role,
    config: SupervisorConfig,
    manager: Arc<M>,
    registry: PidRegistry,
    sentinel: ShutdownSentinel,
    own_pid: ProcessId,
    partner: Option<ProcessId>,
    // set once the partner's own child handle reports an exit; a recycled pid
    // must not bring it back to life
    partner_exited: bool,
    children: Vec<M::Handle>,
    respawn: RespawnPolicy,
}

impl<M: ProcessManager> Supervisor<M> {
    pub fn new(
        role: Role,
        config: SupervisorConfig,
        manager: Arc<M>,
        registry: PidRegistry,
    ) -> Self {
        Self {
            role,
            sentinel: ShutdownSentinel::new(&config.sentinel_path),
            respawn: RespawnPolicy::new(&config.respawn),
            config,
            manager,
            registry,
            own_pid: ProcessId::current(),
            partner: None,
            partner_exited: false,
            children: Vec::new(),
        }
    }

    pub fn partner(&self) -> Option<ProcessId> {
        self.partner
    }

    /// Run until the sentinel appears or `shutdown` completes.
    ///
    /// Returns `Ok(())` for a requested stop. The only error is giving up on a
    /// counterpart that keeps dying.
    pub async fn run<S>(mut self, partner: Option<ProcessId>, shutdown: S) -> Result<(), SupervisorError>
    where
        S: Future<Output = ()>,
    {
        info!(role = %self.role, pid = %self.own_pid, partner = ?partner, "Starting supervisor");

        register_pid(self.registry.clone(), self.own_pid).await;
        match partner {
            Some(pid) => self.partner = Some(pid),
            None => {
                self.respawn.record_spawn(Instant::now());
                self.spawn_counterpart().await;
            }
        }

        let heartbeat = spawn_heartbeat(
            self.registry.clone(),
            self.own_pid,
            self.config.heartbeat_interval,
        );

        tokio::pin!(shutdown);
        let result = loop {
            match self.tick().await {
                Ok(Tick::Continue) => {}
                Ok(Tick::Shutdown) => break Ok(()),
                Err(e) => break Err(e),
            }

            tokio::select! {
                _ = &mut shutdown => {
                    info!(role = %self.role, "Termination requested, exiting");
                    break Ok(());
                }
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        };

        heartbeat.abort();
        result
    }

    /// One pass of the control loop: sentinel check, partner check, work.
    pub async fn tick(&mut self) -> Result<Tick, SupervisorError> {
        if self.sentinel.exists() {
            info!(role = %self.role, "Signal file exists, exiting");
            return Ok(Tick::Shutdown);
        }

        self.reap_children().await;

        if !self.partner_alive() {
            let counterpart = self.role.counterpart();
            match self.respawn.on_partner_down(Instant::now()) {
                RespawnDecision::Spawn => {
                    warn!(
                        partner = ?self.partner,
                        attempt = self.respawn.attempts(),
                        "{counterpart} is not alive, restarting it"
                    );
                    self.spawn_counterpart().await;
                }
                RespawnDecision::Wait(remaining) => {
                    debug!(
                        remaining_ms = remaining.as_millis() as u64,
                        "{counterpart} is not alive, holding off restart"
                    );
                }
                RespawnDecision::GiveUp { attempts } => {
                    error!(attempts, "{counterpart} keeps dying, giving up");
                    return Err(SupervisorError::RespawnLimitExceeded {
                        role: self.role,
                        attempts,
                    });
                }
            }
        }

        self.perform_work();
        Ok(Tick::Continue)
    }

    fn partner_alive(&self) -> bool {
        let Some(partner) = self.partner else {
            return false;
        };
        if self.partner_exited {
            return false;
        }
        if self
            .children
            .iter()
            .any(|child| child.get_pid() == Some(partner))
        {
            return true;
        }
        self.manager.is_alive(partner)
    }

    async fn reap_children(&mut self) {
        let mut running = Vec::with_capacity(self.children.len());
        for mut child in self.children.drain(..) {
            // a reaped handle no longer reports its pid
            let pid = child.get_pid();
            match child.try_wait().await {
                Ok(None) => running.push(child),
                Ok(Some(status)) => {
                    info!(
                        pid = ?pid,
                        command = child.get_command(),
                        status = %status,
                        "Child process exited"
                    );
                    if pid.is_some() && pid == self.partner {
                        self.partner_exited = true;
                    }
                }
                Err(e) => {
                    warn!(pid = ?pid, error = %e, "Failed to poll child process");
                }
            }
        }
        self.children = running;
    }

    async fn spawn_counterpart(&mut self) {
        let counterpart = self.role.counterpart();
        let mut args = self.config.forwarded_args.clone();
        args.push(counterpart.subcommand().to_string());
        args.push(self.own_pid.to_string());

        let handle = match self.manager.spawn_process(&self.config.executable, &args) {
            Ok(handle) => handle,
            Err(e) => {
                error!(
                    executable = %self.config.executable.display(),
                    error = %e,
                    "Failed to start {counterpart}"
                );
                return;
            }
        };

        match handle.get_pid() {
            Some(pid) => {
                info!(pid = %pid, "Started {counterpart}");
                register_pid(self.registry.clone(), pid).await;
                self.partner = Some(pid);
                self.partner_exited = false;
                self.children.push(handle);
            }
            None => warn!("Started {counterpart} but it exited before reporting a pid"),
        }
    }

    fn perform_work(&self) {
        match self.role {
            Role::Monitor => info!(
                partner = ?self.partner,
                children = self.children.len(),
                "Monitoring..."
            ),
            Role::Worker => info!("Doing some work..."),
        }
    }
}

fn spawn_heartbeat(registry: PidRegistry, pid: ProcessId, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
        loop {
            ticker.tick().await;
            debug!(pid = %pid, "Heartbeat");
            register_pid(registry.clone(), pid).await;
        }
    })
}

/// Add `pid` to the registry on the blocking pool, since the file lock may
/// be held by another member for the duration of its read-modify-write.
async fn register_pid(registry: PidRegistry, pid: ProcessId) {
    match tokio::task::spawn_blocking(move || registry.append(pid)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) if e.is_transient() => warn!(pid = %pid, error = %e, "Failed to register pid"),
        Ok(Err(e)) => error!(pid = %pid, error = %e, "Failed to register pid, registry is unreadable"),
        Err(e) => error!(pid = %pid, error = %e, "Registry update task failed"),
    }
}
