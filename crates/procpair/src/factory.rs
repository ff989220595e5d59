use procpair_core::{ProcessManagerFactory, RegistryLocker};
use std::future::Future;
use std::sync::Arc;

/// Platform-independent factory that selects the appropriate implementation at compile time
pub struct PlatformProcessManagerFactory;

impl ProcessManagerFactory for PlatformProcessManagerFactory {
    #[cfg(unix)]
    type Manager = procpair_unix::UnixProcessManager;

    #[cfg(windows)]
    type Manager = procpair_windows::WindowsProcessManager;

    fn create_process_manager() -> Self::Manager {
        #[cfg(unix)]
        return procpair_unix::UnixProcessManagerFactory::create_process_manager();

        #[cfg(windows)]
        return procpair_windows::WindowsProcessManagerFactory::create_process_manager();
    }

    fn platform_name() -> &'static str {
        #[cfg(unix)]
        return procpair_unix::UnixProcessManagerFactory::platform_name();

        #[cfg(windows)]
        return procpair_windows::WindowsProcessManagerFactory::platform_name();
    }
}

#[cfg(not(any(unix, windows)))]
compile_error!("Unsupported platform: only Unix and Windows are currently supported");

pub type PlatformProcessManager = <PlatformProcessManagerFactory as ProcessManagerFactory>::Manager;

/// Advisory lock used to serialize pid registry updates on this platform
pub fn platform_registry_locker() -> Arc<dyn RegistryLocker> {
    #[cfg(unix)]
    return Arc::new(procpair_unix::UnixRegistryLocker);

    #[cfg(windows)]
    return Arc::new(procpair_windows::WindowsRegistryLocker);
}

/// Install the platform's termination handlers and return a future that
/// completes when one fires. Must be called from within a Tokio runtime.
pub fn termination_signal() -> std::io::Result<impl Future<Output = ()> + Send + 'static> {
    #[cfg(unix)]
    return procpair_unix::termination_signal();

    #[cfg(windows)]
    return procpair_windows::termination_signal();
}
