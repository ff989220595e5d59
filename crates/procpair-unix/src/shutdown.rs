#[cfg(unix)]
mod unix_impl {
    use std::future::Future;
    use std::io;
    use tokio::signal::unix::{SignalKind, signal};
    use tracing::{info, warn};

    /// Future that completes on SIGTERM or Ctrl-C.
    ///
    /// The SIGTERM handler is installed before this returns, so a `stop` that
    /// races with startup cannot kill the process with the default action.
    /// Must be called from within a Tokio runtime.
    pub fn termination_signal() -> io::Result<impl Future<Output = ()> + Send + 'static> {
        let mut sigterm = signal(SignalKind::terminate())?;
        Ok(async move {
            tokio::select! {
                _ = sigterm.recv() => info!("Received SIGTERM"),
                result = tokio::signal::ctrl_c() => match result {
                    Ok(()) => info!("Received Ctrl-C"),
                    Err(e) => {
                        warn!(error = %e, "Failed to listen for Ctrl-C, waiting for SIGTERM only");
                        sigterm.recv().await;
                    }
                },
            }
        })
    }

}

#[cfg(unix)]
pub use unix_impl::termination_signal;
