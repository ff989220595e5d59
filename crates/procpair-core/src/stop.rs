use crate::error::SentinelError;
use crate::process::{ProcessId, ProcessTermination, TerminationResult};
use crate::registry::PidRegistry;
use crate::sentinel::ShutdownSentinel;
use tracing::{error, info, warn};

/// What happened to each registered pid during a stop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopReport {
    pub signalled: Vec<ProcessId>,
    pub not_found: Vec<ProcessId>,
    pub failed: Vec<(ProcessId, String)>,
}

impl StopReport {
    pub fn attempted(&self) -> usize {
        self.signalled.len() + self.not_found.len() + self.failed.len()
    }
}

/// Ask every supervised process to exit.
///
/// The sentinel is written first so that any process missed by the signal
/// sweep, or spawned during it, still exits on its next poll. Failing to write
/// the sentinel aborts before anything is signalled. Per-pid failures are
/// collected in the report and never stop the sweep. The calling process is
/// skipped if it happens to be registered.
pub async fn stop<T>(
    sentinel: &ShutdownSentinel,
    registry: &PidRegistry,
    terminator: &T,
) -> Result<StopReport, SentinelError>
where
    T: ProcessTermination + ?Sized,
{
    sentinel.create()?;
    info!(path = %sentinel.path().display(), "Created stop signal file");

    let pids = match registry.load() {
        Ok(pids) => pids,
        Err(e) => {
            error!(error = %e, "Failed to read pid registry, relying on the stop signal file");
            return Ok(StopReport::default());
        }
    };

    let own_pid = ProcessId::current();
    let mut report = StopReport::default();
    for pid in pids.into_iter().filter(|pid| *pid != own_pid) {
        match terminator.terminate_gracefully(pid).await {
            TerminationResult::Success => {
                info!(pid = %pid, "Sent termination signal");
                report.signalled.push(pid);
            }
            TerminationResult::ProcessNotFound => {
                info!(pid = %pid, "Process already gone");
                report.not_found.push(pid);
            }
            TerminationResult::AccessDenied => {
                warn!(pid = %pid, "Access denied while signalling process");
                report.failed.push((pid, "access denied".to_string()));
            }
            TerminationResult::Failed(reason) => {
                warn!(pid = %pid, reason = %reason, "Failed to signal process");
                report.failed.push((pid, reason));
            }
        }
    }

    info!(
        signalled = report.signalled.len(),
        not_found = report.not_found.len(),
        failed = report.failed.len(),
        "Stop sweep finished"
    );
    Ok(report)
}
