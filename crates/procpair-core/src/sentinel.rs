use crate::error::SentinelError;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Presence-only stop flag shared through the filesystem
#[derive(Debug, Clone)]
pub struct ShutdownSentinel {
    path: PathBuf,
}

impl ShutdownSentinel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a stop has been requested. An unreadable location counts as absent.
    pub fn exists(&self) -> bool {
        match self.path.try_exists() {
            Ok(exists) => exists,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to check stop signal file");
                false
            }
        }
    }

    /// Create the marker file. Succeeds if it is already there.
    pub fn create(&self) -> Result<(), SentinelError> {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map(drop)
            .map_err(|source| SentinelError {
                path: self.path.clone(),
                source,
            })
    }
}
