#[cfg(windows)]
mod windows_impl {
    use procpair_core::{RegistryLock, RegistryLocker};
    use std::fs::File;
    use std::io;
    use tracing::warn;

    /// Whole-file `LockFileEx` lock on the pid registry
    #[derive(Debug, Default, Clone, Copy)]
    pub struct WindowsRegistryLocker;

    struct LockedFile(File);

    impl Drop for LockedFile {
        fn drop(&mut self) {
            if let Err(e) = self.0.unlock() {
                warn!(error = %e, "Failed to unlock pid registry");
            }
        }
    }

    impl RegistryLocker for WindowsRegistryLocker {
        fn lock_exclusive(&self, file: &File) -> io::Result<RegistryLock> {
            // The duplicated handle shares the file object that owns the lock
            let file = file.try_clone()?;
            file.lock()?;
            Ok(RegistryLock::new(LockedFile(file)))
        }
    }

}

#[cfg(windows)]
pub use windows_impl::WindowsRegistryLocker;
