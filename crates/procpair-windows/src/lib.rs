//! Windows-specific process management implementation

mod file_lock;
mod shutdown;
mod windows_process_manager;

#[cfg(windows)]
pub use file_lock::WindowsRegistryLocker;
#[cfg(windows)]
pub use shutdown::termination_signal;
#[cfg(windows)]
pub use windows_process_manager::{WindowsProcessHandle, WindowsProcessManager};

/// Windows-specific process manager factory
pub struct WindowsProcessManagerFactory;

#[cfg(windows)]
impl procpair_core::ProcessManagerFactory for WindowsProcessManagerFactory {
    type Manager = WindowsProcessManager;

    fn create_process_manager() -> WindowsProcessManager {
        use procpair_core::ProcessManager;
        WindowsProcessManager::new()
    }

    fn platform_name() -> &'static str {
        "Windows"
    }
}
