#[cfg(unix)]
mod unix_impl {
    use anyhow::Result;
    use async_trait::async_trait;
    use procpair_core::{
        ProcessHandle, ProcessId, ProcessLifecycle, ProcessManager, ProcessTermination,
        TerminationResult,
    };
    use std::path::Path;
    use std::process::ExitStatus;
    use nix::errno::Errno;
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid as NixPid;
    use std::process::Stdio;
    use std::sync::Mutex;
    use sysinfo::{Pid, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System};
    use tokio::process::{Child, Command};
    use tracing::{debug, info, warn};

    /// Unix-specific process handle implementation
    pub struct UnixProcessHandle {
        child: Child,
        command: String,
    }

    impl UnixProcessHandle {
        pub fn new(child: Child, command: String) -> Self {
            Self { child, command }
        }
    }

    #[async_trait]
    impl ProcessHandle for UnixProcessHandle {
        fn get_pid(&self) -> Option<ProcessId> {
            self.child.id().map(ProcessId::from)
        }

        fn get_command(&self) -> &str {
            &self.command
        }

        async fn try_wait(&mut self) -> Result<Option<ExitStatus>> {
            Ok(self.child.try_wait()?)
        }
    }

    /// Unix process manager backed by signals, with sysinfo to spot zombies
    pub struct UnixProcessManager {
        system: Mutex<System>,
    }

    impl Default for UnixProcessManager {
        fn default() -> Self {
            Self::new()
        }
    }

    fn to_nix_pid(pid: ProcessId) -> Option<NixPid> {
        // pids above i32::MAX would wrap into process-group targets
        i32::try_from(pid.0)
            .ok()
            .filter(|raw| *raw > 0)
            .map(NixPid::from_raw)
    }

    impl ProcessLifecycle for UnixProcessManager {
        type Handle = UnixProcessHandle;

        fn spawn_process(&self, command: &Path, args: &[String]) -> std::io::Result<UnixProcessHandle> {
            let mut cmd = Command::new(command);
            cmd.args(args).stdin(Stdio::null());

            // Own process group so a terminal signal aimed at us spares the partner
            cmd.process_group(0);

            let child = cmd.spawn()?;
            if let Some(pid) = child.id() {
                info!(
                    pid = %pid,
                    command = %command.display(),
                    args = ?args,
                    "Spawned Unix process"
                );
            }

            Ok(UnixProcessHandle::new(
                child,
                command.display().to_string(),
            ))
        }

        fn is_alive(&self, pid: ProcessId) -> bool {
            let Some(nix_pid) = to_nix_pid(pid) else {
                return false;
            };
            if let Err(e) = signal::kill(nix_pid, None) {
                debug!(pid = %pid, error = %e, "Liveness probe failed");
                return false;
            }
            !self.is_zombie(pid)
        }
    }

    #[async_trait]
    impl ProcessTermination for UnixProcessManager {
        async fn terminate_gracefully(&self, pid: ProcessId) -> TerminationResult {
            let Some(nix_pid) = to_nix_pid(pid) else {
                return TerminationResult::ProcessNotFound;
            };

            match signal::kill(nix_pid, Signal::SIGTERM) {
                Ok(()) => {
                    info!(pid = %pid, "Sent SIGTERM to process");
                    TerminationResult::Success
                }
                Err(Errno::ESRCH) => {
                    info!(pid = %pid, "Process not found (already terminated)");
                    TerminationResult::ProcessNotFound
                }
                Err(Errno::EPERM) => {
                    warn!(pid = %pid, "Permission denied to terminate process");
                    TerminationResult::AccessDenied
                }
                Err(e) => {
                    warn!(pid = %pid, error = %e, "Failed to send SIGTERM to process");
                    TerminationResult::Failed(format!("SIGTERM failed: {e}"))
                }
            }
        }
    }

    impl UnixProcessManager {
        /// An exited but unreaped process still answers signal 0
        fn is_zombie(&self, pid: ProcessId) -> bool {
            let mut system = self.system.lock().unwrap_or_else(|e| e.into_inner());
            let target = Pid::from_u32(pid.0);
            system.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[target]),
                true,
                ProcessRefreshKind::nothing(),
            );
            system
                .process(target)
                .is_some_and(|process| process.status() == ProcessStatus::Zombie)
        }
    }

    impl ProcessManager for UnixProcessManager {
        fn new() -> Self {
            debug!("Initializing Unix process manager");
            Self {
                system: Mutex::new(System::new()),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn sleeper(manager: &UnixProcessManager) -> UnixProcessHandle {
            manager
                .spawn_process(Path::new("sleep"), &["30".to_string()])
                .unwrap()
        }

        #[tokio::test]
        async fn test_spawned_process_is_alive() {
            let manager = UnixProcessManager::new();
            let mut handle = sleeper(&manager);
            let pid = handle.get_pid().unwrap();

            assert!(manager.is_alive(pid));
            assert!(handle.try_wait().await.unwrap().is_none());
            assert_eq!(handle.get_command(), "sleep");

            assert_eq!(
                manager.terminate_gracefully(pid).await,
                TerminationResult::Success
            );
            handle.child.wait().await.unwrap();
            assert!(!manager.is_alive(pid));
        }

        #[tokio::test]
        async fn test_unreaped_child_is_not_alive() {
            let manager = UnixProcessManager::new();
            let handle = sleeper(&manager);
            let pid = handle.get_pid().unwrap();

            signal::kill(to_nix_pid(pid).unwrap(), Signal::SIGKILL).unwrap();
            let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
            while manager.is_alive(pid) && tokio::time::Instant::now() < deadline {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            }
            assert!(!manager.is_alive(pid));
            drop(handle);
        }

        #[tokio::test]
        async fn test_out_of_range_pids() {
            let manager = UnixProcessManager::new();
            assert!(!manager.is_alive(ProcessId(u32::MAX)));
            assert_eq!(
                manager.terminate_gracefully(ProcessId(u32::MAX)).await,
                TerminationResult::ProcessNotFound
            );
        }

        #[test]
        fn test_current_process_is_alive() {
            let manager = UnixProcessManager::new();
            assert!(manager.is_alive(ProcessId::current()));
        }
    }
}

// Re-export the Unix implementation when on Unix systems
#[cfg(unix)]
pub use unix_impl::{UnixProcessHandle, UnixProcessManager};
