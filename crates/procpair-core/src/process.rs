use crate::error::ProcessIdError;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::process::ExitStatus;
use std::str::FromStr;

/// Unique identifier for a process at a point in time.
///
/// The OS may hand the same value to an unrelated process once the original
/// exits, so a `ProcessId` is a lookup key, never proof of identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(pub u32);

impl ProcessId {
    /// Identifier of the calling process
    pub fn current() -> Self {
        Self(std::process::id())
    }
}

impl From<u32> for ProcessId {
    fn from(pid: u32) -> Self {
        Self(pid)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProcessId {
    type Err = ProcessIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pid = s
            .trim()
            .parse::<u32>()
            .map_err(|source| ProcessIdError::Invalid {
                value: s.to_string(),
                source,
            })?;
        if pid == 0 {
            return Err(ProcessIdError::Zero);
        }
        Ok(Self(pid))
    }
}

/// Which half of the pair a supervisor plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Monitor,
    Worker,
}

impl Role {
    /// The role this supervisor keeps alive
    pub fn counterpart(self) -> Role {
        match self {
            Role::Monitor => Role::Worker,
            Role::Worker => Role::Monitor,
        }
    }

    /// Command-line verb that starts a process in this role
    pub fn subcommand(self) -> &'static str {
        match self {
            Role::Monitor => "start-monitor",
            Role::Worker => "start-worker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Monitor => f.write_str("monitor"),
            Role::Worker => f.write_str("worker"),
        }
    }
}

/// Result of a process termination operation
#[derive(Debug, Clone, PartialEq)]
pub enum TerminationResult {
    /// Termination request was delivered
    Success,
    /// Process was not found (already exited)
    ProcessNotFound,
    /// Insufficient privileges to signal the process
    AccessDenied,
    /// Operation failed with specific error message
    Failed(String),
}

/// Trait representing a handle to a process this supervisor spawned
#[async_trait]
pub trait ProcessHandle: Send + Sync {
    /// Get the process ID (None if process has exited)
    fn get_pid(&self) -> Option<ProcessId>;

    /// Get the command that started this process
    fn get_command(&self) -> &str;

    /// Try to get exit status without blocking. A returned status means the
    /// process has been reaped.
    async fn try_wait(&mut self) -> Result<Option<ExitStatus>>;
}

/// Spawning and liveness probing
pub trait ProcessLifecycle: Send + Sync {
    /// The type of process handle this lifecycle manager produces
    type Handle: ProcessHandle;

    /// Spawn a detached process with the given command and arguments
    fn spawn_process(&self, command: &Path, args: &[String]) -> std::io::Result<Self::Handle>;

    /// Check whether `pid` currently names a running process.
    ///
    /// Never fails: anything that prevents a positive answer, including
    /// permission errors, reads as not alive.
    fn is_alive(&self, pid: ProcessId) -> bool;
}

/// Trait for delivering termination requests by pid
#[async_trait]
pub trait ProcessTermination: Send + Sync {
    /// Ask a process to exit gracefully (SIGTERM on Unix). Does not wait.
    async fn terminate_gracefully(&self, pid: ProcessId) -> TerminationResult;
}

/// Platform process manager combining lifecycle and termination
pub trait ProcessManager: ProcessLifecycle + ProcessTermination {
    /// Create a new process manager instance
    fn new() -> Self
    where
        Self: Sized;
}

/// Factory trait for creating platform-specific process managers
pub trait ProcessManagerFactory {
    /// The type of process manager this factory creates
    type Manager: ProcessManager;

    /// Create a process manager for the current platform
    fn create_process_manager() -> Self::Manager;

    /// Get the platform name for logging and debugging
    fn platform_name() -> &'static str;
}
