#[cfg(windows)]
mod windows_impl {
    use anyhow::Result;
    use async_trait::async_trait;
    use procpair_core::{
        ProcessHandle, ProcessId, ProcessLifecycle, ProcessManager, ProcessTermination,
        TerminationResult,
    };
    use std::path::Path;
    use std::process::{ExitStatus, Stdio};
    use std::sync::Mutex;
    use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
    use tokio::process::{Child, Command};
    use tracing::{debug, info, warn};
    use windows::Win32::Foundation::{CloseHandle, STILL_ACTIVE};
    use windows::Win32::System::Threading::{
        GetExitCodeProcess, OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION,
    };

    /// CREATE_NO_WINDOW: the counterpart runs in the background without a console popup
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;

    /// Windows-specific process handle implementation
    pub struct WindowsProcessHandle {
        child: Child,
        command: String,
    }

    impl WindowsProcessHandle {
        pub fn new(child: Child, command: String) -> Self {
            Self { child, command }
        }
    }

    #[async_trait]
    impl ProcessHandle for WindowsProcessHandle {
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

    /// Windows process manager using the process table and exit codes
    pub struct WindowsProcessManager {
        system: Mutex<System>,
    }

    impl Default for WindowsProcessManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ProcessLifecycle for WindowsProcessManager {
        type Handle = WindowsProcessHandle;

        fn spawn_process(
            &self,
            command: &Path,
            args: &[String],
        ) -> std::io::Result<WindowsProcessHandle> {
            let mut cmd = Command::new(command);
            cmd.args(args)
                .stdin(Stdio::null())
                .creation_flags(CREATE_NO_WINDOW);

            let child = cmd.spawn()?;
            if let Some(pid) = child.id() {
                info!(
                    pid = %pid,
                    command = %command.display(),
                    args = ?args,
                    "Spawned Windows process"
                );
            }

            Ok(WindowsProcessHandle::new(
                child,
                command.display().to_string(),
            ))
        }

        fn is_alive(&self, pid: ProcessId) -> bool {
            self.in_process_table(pid) && still_active(pid)
        }
    }

    /// Exited processes linger in the table while handles to them stay open
    fn still_active(pid: ProcessId) -> bool {
        // SAFETY: the handle is only used here and closed before returning
        unsafe {
            let handle = match OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid.0) {
                Ok(handle) => handle,
                Err(e) => {
                    debug!(pid = %pid, error = %e, "Failed to open process");
                    return false;
                }
            };
            let mut code = 0u32;
            let queried = GetExitCodeProcess(handle, &mut code);
            let _ = CloseHandle(handle);
            queried.is_ok() && code == STILL_ACTIVE.0 as u32
        }
    }

    #[async_trait]
    impl ProcessTermination for WindowsProcessManager {
        /// `taskkill` without `/F` posts a close request to the target's windows.
        /// Members run with `CREATE_NO_WINDOW` have none, so for them this reports
        /// `Failed`, and their `termination_signal` never fires. A stop then takes
        /// effect through the stop signal file on the member's next poll.
        async fn terminate_gracefully(&self, pid: ProcessId) -> TerminationResult {
            if !self.is_alive(pid) {
                info!(pid = %pid, "Process not found (already terminated)");
                return TerminationResult::ProcessNotFound;
            }

            // Without /F taskkill asks the process to close instead of ending it
            let output = Command::new("taskkill")
                .args(["/PID", &pid.to_string()])
                .output()
                .await;
            match output {
                Ok(output) if output.status.success() => {
                    info!(pid = %pid, "Sent graceful termination to process");
                    TerminationResult::Success
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                    warn!(pid = %pid, stderr = %stderr, "taskkill refused to terminate process");
                    TerminationResult::Failed(format!("taskkill failed: {stderr}"))
                }
                Err(e) => {
                    warn!(pid = %pid, error = %e, "Failed to run taskkill");
                    TerminationResult::Failed(format!("taskkill could not run: {e}"))
                }
            }
        }
    }

    impl WindowsProcessManager {
        fn in_process_table(&self, pid: ProcessId) -> bool {
            let mut system = self.system.lock().unwrap_or_else(|e| e.into_inner());
            let target = Pid::from_u32(pid.0);
            system.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[target]),
                true,
                ProcessRefreshKind::nothing(),
            );
            system.process(target).is_some()
        }
    }

    impl ProcessManager for WindowsProcessManager {
        fn new() -> Self {
            debug!("Initializing Windows process manager");
            Self {
                system: Mutex::new(System::new()),
            }
        }
    }

}

#[cfg(windows)]
pub use windows_impl::{WindowsProcessHandle, WindowsProcessManager};
