#[cfg(unix)]
mod unix_impl {
    use nix::fcntl::{Flock, FlockArg};
    use procpair_core::{RegistryLock, RegistryLocker};
    use std::fs::File;
    use std::io;

    /// `flock(2)` based lock on the pid registry. Advisory only, so it guards
    /// procpair processes from each other and nothing else.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct UnixRegistryLocker;

    impl RegistryLocker for UnixRegistryLocker {
        fn lock_exclusive(&self, file: &File) -> io::Result<RegistryLock> {
            // The duplicate shares the open file description, and with it the lock
            let flock = Flock::lock(file.try_clone()?, FlockArg::LockExclusive)
                .map_err(|(_, errno)| io::Error::from(errno))?;
            Ok(RegistryLock::new(flock))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::fs::OpenOptions;

        #[test]
        fn test_lock_excludes_other_descriptions() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("pids");
            let open = || {
                OpenOptions::new()
                    .read(true)
                    .append(true)
                    .create(true)
                    .open(&path)
                    .unwrap()
            };

            let first = open();
            let guard = UnixRegistryLocker.lock_exclusive(&first).unwrap();

            let contender = Flock::lock(open(), FlockArg::LockExclusiveNonblock);
            assert!(contender.is_err());

            drop(guard);
            assert!(Flock::lock(open(), FlockArg::LockExclusiveNonblock).is_ok());
        }
    }
}

#[cfg(unix)]
pub use unix_impl::UnixRegistryLocker;
