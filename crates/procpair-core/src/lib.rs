//! procpair core - platform-independent pieces of the process-pair supervisor
//!
//! This crate provides the process traits, configuration, error types and the
//! file-backed coordination state (pid registry and shutdown sentinel) shared by
//! the platform-specific implementations, plus the supervision loop itself.

mod config;
mod error;
mod process;
mod registry;
mod respawn;
mod sentinel;
mod stop;
mod supervisor;

#[cfg(test)]
mod testing;

pub use config::*;
pub use error::*;
pub use process::*;
pub use registry::{PidRegistry, RegistryLock, RegistryLocker};
pub use respawn::{RespawnDecision, RespawnPolicy};
pub use sentinel::ShutdownSentinel;
pub use stop::{StopReport, stop};
pub use supervisor::{Supervisor, Tick};
