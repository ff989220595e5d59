#[cfg(windows)]
mod windows_impl {
    use std::future::Future;
    use std::io;
    use tokio::signal::windows::{ctrl_break, ctrl_c, ctrl_close};
    use tracing::info;

    /// Future that completes on Ctrl-C, Ctrl-Break or console close.
    ///
    /// Handlers are installed before this returns. Must be called from within
    /// a Tokio runtime.
    pub fn termination_signal() -> io::Result<impl Future<Output = ()> + Send + 'static> {
        let mut interrupt = ctrl_c()?;
        let mut brk = ctrl_break()?;
        let mut close = ctrl_close()?;
        Ok(async move {
            tokio::select! {
                _ = interrupt.recv() => info!("Received Ctrl-C"),
                _ = brk.recv() => info!("Received Ctrl-Break"),
                _ = close.recv() => info!("Console is closing"),
            }
        })
    }
}

#[cfg(windows)]
pub use windows_impl::termination_signal;
