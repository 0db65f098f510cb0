//! Runtime status types exposed to hosts.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a supervised process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    /// Not running. Initial state and the landing state of a clean stop.
    #[default]
    Stopped,
    /// Spawn in progress.
    Starting,
    /// OS process is alive.
    Running,
    /// Termination has been requested and is in progress.
    Stopping,
    /// Exited on its own; an automatic restart is scheduled.
    RestartWaiting,
    /// Failed and will not be restarted until started manually.
    Crashed,
}

impl ProcessStatus {
    /// Whether the record has no run or pending restart attached.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Crashed)
    }

    /// Stable string form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::RestartWaiting => "restart_waiting",
            Self::Crashed => "crashed",
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only, point-in-time projection of a supervised process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSnapshot {
    /// Process ID from the definition.
    pub id: String,
    /// Display name from the definition.
    pub name: String,
    /// Current lifecycle state.
    pub status: ProcessStatus,
    /// OS process ID while an OS process exists.
    pub pid: Option<u32>,
    /// When the current (or last) run was spawned.
    pub started_at: Option<DateTime<Utc>>,
    /// Automatic restarts since the last reset.
    pub restart_count: u32,
    /// Exit code of the last run, if it exited normally.
    pub last_exit_code: Option<i32>,
    /// Last spawn or exit error.
    pub last_error: Option<String>,
}

impl ProcessSnapshot {
    /// Uptime of the current run, if running.
    pub fn uptime(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        match (self.status, self.started_at) {
            (ProcessStatus::Running, Some(started)) => Some(now - started),
            _ => None,
        }
    }
}
