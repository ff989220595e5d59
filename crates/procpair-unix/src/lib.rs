//! Unix-specific process management implementation

mod file_lock;
mod shutdown;
mod unix_process_manager;

#[cfg(unix)]
pub use file_lock::UnixRegistryLocker;
#[cfg(unix)]
pub use shutdown::termination_signal;
#[cfg(unix)]
pub use unix_process_manager::{UnixProcessHandle, UnixProcessManager};

/// Unix-specific process manager factory
pub struct UnixProcessManagerFactory;

#[cfg(unix)]
impl procpair_core::ProcessManagerFactory for UnixProcessManagerFactory {
    type Manager = UnixProcessManager;

    fn create_process_manager() -> UnixProcessManager {
        use procpair_core::ProcessManager;
        UnixProcessManager::new()
    }

    fn platform_name() -> &'static str {
        "Unix"
    }
}
