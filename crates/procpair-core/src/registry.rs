//! File-backed set of process identifiers.
//!
//! The registry is a plain text file holding one decimal pid per line. Every
//! supervised process writes to it (heartbeats and spawn events), so each
//! read-modify-write runs under an exclusive advisory lock supplied by the
//! platform crate through [`RegistryLocker`].

use crate::error::RegistryError;
use crate::process::ProcessId;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Held exclusive lock on the registry file. Dropping it releases the lock.
pub struct RegistryLock {
    _guard: Box<dyn Send>,
}

impl RegistryLock {
    /// Wrap a platform guard whose `Drop` releases the lock
    pub fn new<G: Send + 'static>(guard: G) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }
}

/// Platform seam for advisory file locking
pub trait RegistryLocker: Send + Sync {
    /// Block until an exclusive lock on `file` is held
    fn lock_exclusive(&self, file: &File) -> io::Result<RegistryLock>;
}

#[derive(Clone)]
pub struct PidRegistry {
    path: PathBuf,
    locker: Arc<dyn RegistryLocker>,
}

impl PidRegistry {
    pub fn new(path: impl Into<PathBuf>, locker: Arc<dyn RegistryLocker>) -> Self {
        Self {
            path: path.into(),
            locker,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every registered pid. A missing file is an empty registry.
    pub fn load(&self) -> Result<Vec<ProcessId>, RegistryError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => parse_registry(&self.path, &contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    /// Register `pid`, creating the file if needed.
    ///
    /// Returns `false` when the pid was already present, in which case the
    /// file is left untouched.
    pub fn append(&self, pid: ProcessId) -> Result<bool, RegistryError> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        let _lock = self
            .locker
            .lock_exclusive(&file)
            .map_err(|e| self.io_error(e))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| self.io_error(e))?;
        if parse_registry(&self.path, &contents)?.contains(&pid) {
            return Ok(false);
        }

        let mut line = String::new();
        if !contents.is_empty() && !contents.ends_with('\n') {
            line.push('\n');
        }
        line.push_str(&format!("{pid}\n"));
        file.write_all(line.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| self.io_error(e))?;

        debug!(pid = %pid, path = %self.path.display(), "Registered pid");
        Ok(true)
    }

    /// Drop every entry for which `is_alive` is false and return the removed pids.
    pub fn prune<F>(&self, is_alive: F) -> Result<Vec<ProcessId>, RegistryError>
    where
        F: Fn(ProcessId) -> bool,
    {
        let mut file = match OpenOptions::new().read(true).write(true).open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        let _lock = self
            .locker
            .lock_exclusive(&file)
            .map_err(|e| self.io_error(e))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| self.io_error(e))?;
        let (alive, dead): (Vec<_>, Vec<_>) = parse_registry(&self.path, &contents)?
            .into_iter()
            .partition(|pid| is_alive(*pid));
        if dead.is_empty() {
            return Ok(dead);
        }

        let rewritten: String = alive.iter().map(|pid| format!("{pid}\n")).collect();
        overwrite(&mut file, &rewritten).map_err(|e| self.io_error(e))?;

        debug!(removed = dead.len(), kept = alive.len(), "Pruned pid registry");
        Ok(dead)
    }

    fn io_error(&self, source: io::Error) -> RegistryError {
        RegistryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn overwrite(file: &mut File, contents: &str) -> io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(contents.as_bytes())?;
    file.flush()
}

fn parse_registry(path: &Path, contents: &str) -> Result<Vec<ProcessId>, RegistryError> {
    let mut pids = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let pid = line.parse().map_err(|source| RegistryError::Parse {
            path: path.to_path_buf(),
            line: index + 1,
            source,
        })?;
        pids.push(pid);
    }
    Ok(pids)
}
