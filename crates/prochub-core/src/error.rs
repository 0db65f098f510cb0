//! Error taxonomy for supervisor and log storage operations.
//!
//! These types are shared by the runtime and by hosts so that failures can be
//! matched on without depending on runtime internals.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors returned by supervisor operations.
///
/// Failures are always local to one process; none of them poison the
/// supervisor or affect other records.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// No definition is registered under this ID.
    #[error("Process not found: {0}")]
    NotFound(String),

    /// The definition failed validation.
    #[error("Invalid process definition: {0}")]
    InvalidDefinition(String),

    /// The executable could not be launched.
    #[error("Failed to spawn process {id}: {reason}")]
    SpawnFailure { id: String, reason: String },

    /// The process did not reach a terminal state within the allotted time.
    #[error("Process {id} did not stop within {waited:?}")]
    TerminationTimeout { id: String, waited: Duration },

    /// A log sink was already installed.
    #[error("Log sink is already installed")]
    LogSinkAlreadySet,
}

impl SupervisorError {
    /// Whether this error refers to an unknown process ID.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Errors from durable log storage.
///
/// A write failure is the "log write failure" of the supervisor's error model:
/// it is reported to the caller but never interrupts output capture.
#[derive(Debug, Error)]
pub enum LogStoreError {
    /// The log directory could not be created.
    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A segment could not be opened or written.
    #[error("Failed to write log file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A segment could not be read back.
    #[error("Failed to read log file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Exported history could not be written to the destination.
    #[error("Failed to export logs to {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SupervisorError::SpawnFailure {
            id: "web".into(),
            reason: "No such file or directory".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to spawn process web: No such file or directory"
        );
        assert!(SupervisorError::NotFound("x".into()).is_not_found());
    }

    #[test]
    fn test_log_store_error_keeps_source() {
        use std::error::Error as _;
        let err = LogStoreError::Write {
            path: PathBuf::from("/tmp/x.log"),
            source: io::Error::other("disk full"),
        };
        assert!(err.to_string().contains("/tmp/x.log"));
        assert!(err.source().is_some());
    }
}
