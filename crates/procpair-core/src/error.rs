use crate::process::Role;
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced when parsing a process identifier
#[derive(Error, Debug)]
pub enum ProcessIdError {
    #[error("invalid process id {value:?}: {source}")]
    Invalid {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("process id must be a positive integer, got 0")]
    Zero,
}

/// Errors raised while reading or writing the pid registry file
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("pid registry {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("pid registry {} line {line}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: ProcessIdError,
    },
}

impl RegistryError {
    /// Check if this error may clear up on a later attempt
    pub fn is_transient(&self) -> bool {
        matches!(self, RegistryError::Io { .. })
    }
}

/// Failure to create the shutdown sentinel. There is no fallback for this.
#[derive(Error, Debug)]
#[error("failed to create stop signal file {}: {source}", .path.display())]
pub struct SentinelError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Errors that end a supervisor loop
#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("{role} gave up restarting its {} after {attempts} rapid attempts", .role.counterpart())]
    RespawnLimitExceeded { role: Role, attempts: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_categorization() {
        let io = RegistryError::Io {
            path: PathBuf::from("/tmp/pids"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(io.is_transient());

        let parse = RegistryError::Parse {
            path: PathBuf::from("/tmp/pids"),
            line: 3,
            source: ProcessIdError::Zero,
        };
        assert!(!parse.is_transient());
    }

    #[test]
    fn test_error_display() {
        let parse = RegistryError::Parse {
            path: PathBuf::from("/tmp/pids"),
            line: 2,
            source: "abc".parse::<crate::ProcessId>().unwrap_err(),
        };
        let display = format!("{parse}");
        assert!(display.contains("/tmp/pids"));
        assert!(display.contains("line 2"));

        let error = SupervisorError::RespawnLimitExceeded {
            role: Role::Monitor,
            attempts: 4,
        };
        assert_eq!(
            format!("{error}"),
            "monitor gave up restarting its worker after 4 rapid attempts"
        );
    }
}
