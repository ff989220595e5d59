//! In-memory doubles for the platform traits.

use crate::process::{
    ProcessHandle, ProcessId, ProcessLifecycle, ProcessManager, ProcessTermination,
    TerminationResult,
};
use crate::registry::{PidRegistry, RegistryLock, RegistryLocker};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tempfile::TempDir;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Unit tests touch the registry from one thread at a time
pub struct NoopLocker;

impl RegistryLocker for NoopLocker {
    fn lock_exclusive(&self, _file: &File) -> std::io::Result<RegistryLock> {
        Ok(RegistryLock::new(()))
    }
}

/// Takes as long as a lock held by a busy neighbour would
pub struct SlowLocker(pub Duration);

impl RegistryLocker for SlowLocker {
    fn lock_exclusive(&self, _file: &File) -> std::io::Result<RegistryLock> {
        std::thread::sleep(self.0);
        Ok(RegistryLock::new(()))
    }
}

pub fn registry_in() -> (TempDir, PidRegistry) {
    let dir = tempfile::tempdir().unwrap();
    let registry = PidRegistry::new(
        dir.path().join("pids"),
        Arc::new(NoopLocker),
    );
    (dir, registry)
}

pub fn exit_status(code: i32) -> ExitStatus {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }
    #[cfg(windows)]
    {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(code as u32)
    }
}

pub struct FakeHandle {
    pid: ProcessId,
    exited: Arc<AtomicBool>,
}

#[async_trait]
impl ProcessHandle for FakeHandle {
    fn get_pid(&self) -> Option<ProcessId> {
        Some(self.pid)
    }

    fn get_command(&self) -> &str {
        "fake"
    }

    async fn try_wait(&mut self) -> Result<Option<ExitStatus>> {
        if self.exited.load(Ordering::SeqCst) {
            Ok(Some(exit_status(1)))
        } else {
            Ok(None)
        }
    }
}

/// Records spawns and terminations instead of touching real processes
pub struct FakeManager {
    next_pid: AtomicU32,
    fail_spawns: AtomicBool,
    alive: Mutex<HashSet<ProcessId>>,
    children: Mutex<HashMap<ProcessId, Arc<AtomicBool>>>,
    spawned: Mutex<Vec<(PathBuf, Vec<String>)>>,
    refuse_termination: Mutex<HashSet<ProcessId>>,
    terminated: Mutex<Vec<ProcessId>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl FakeManager {
    pub fn mark_alive(&self, pid: ProcessId) {
        lock(&self.alive).insert(pid);
    }

    /// Simulate a process (spawned child or not) exiting
    pub fn kill(&self, pid: ProcessId) {
        lock(&self.alive).remove(&pid);
        if let Some(exited) = lock(&self.children).get(&pid) {
            exited.store(true, Ordering::SeqCst);
        }
    }

    pub fn refuse_termination(&self, pid: ProcessId) {
        lock(&self.refuse_termination).insert(pid);
    }

    pub fn fail_spawns(&self, fail: bool) {
        self.fail_spawns.store(fail, Ordering::SeqCst);
    }

    pub fn spawned(&self) -> Vec<(PathBuf, Vec<String>)> {
        lock(&self.spawned).clone()
    }

    pub fn spawn_count(&self) -> usize {
        lock(&self.spawned).len()
    }

    pub fn terminated(&self) -> Vec<ProcessId> {
        lock(&self.terminated).clone()
    }
}

impl ProcessLifecycle for FakeManager {
    type Handle = FakeHandle;

    fn spawn_process(&self, command: &Path, args: &[String]) -> std::io::Result<FakeHandle> {
        lock(&self.spawned).push((command.to_path_buf(), args.to_vec()));
        if self.fail_spawns.load(Ordering::SeqCst) {
            return Err(std::io::Error::from(std::io::ErrorKind::NotFound));
        }

        let pid = ProcessId(self.next_pid.fetch_add(1, Ordering::SeqCst));
        let exited = Arc::new(AtomicBool::new(false));
        lock(&self.alive).insert(pid);
        lock(&self.children).insert(pid, exited.clone());
        Ok(FakeHandle { pid, exited })
    }

    fn is_alive(&self, pid: ProcessId) -> bool {
        lock(&self.alive).contains(&pid)
    }
}

#[async_trait]
impl ProcessTermination for FakeManager {
    async fn terminate_gracefully(&self, pid: ProcessId) -> TerminationResult {
        if lock(&self.refuse_termination).contains(&pid) {
            return TerminationResult::Failed("refused".to_string());
        }
        if !self.is_alive(pid) {
            return TerminationResult::ProcessNotFound;
        }
        lock(&self.terminated).push(pid);
        self.kill(pid);
        TerminationResult::Success
    }
}

impl ProcessManager for FakeManager {
    fn new() -> Self {
        Self {
            next_pid: AtomicU32::new(1_000),
            fail_spawns: AtomicBool::new(false),
            alive: Mutex::new(HashSet::new()),
            children: Mutex::new(HashMap::new()),
            spawned: Mutex::new(Vec::new()),
            refuse_termination: Mutex::new(HashSet::new()),
            terminated: Mutex::new(Vec::new()),
        }
    }
}
