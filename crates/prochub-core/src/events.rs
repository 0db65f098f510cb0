//! Process lifecycle events for real-time state synchronization.
//!
//! These events are emitted by the supervisor on every state transition and
//! consumed by hosts that want push updates instead of polling snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ProcessSnapshot, ProcessStatus};

/// A single process's state at the moment of a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessStateInfo {
    /// Process ID from the definition.
    pub process_id: String,
    /// New status.
    pub status: ProcessStatus,
    /// OS process ID, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    /// Restart counter after the transition.
    pub restart_count: u32,
    /// When this state was recorded.
    pub updated_at: DateTime<Utc>,
}

impl From<&ProcessSnapshot> for ProcessStateInfo {
    fn from(snapshot: &ProcessSnapshot) -> Self {
        Self {
            process_id: snapshot.id.clone(),
            status: snapshot.status,
            pid: snapshot.pid,
            restart_count: snapshot.restart_count,
            updated_at: Utc::now(),
        }
    }
}

/// Process lifecycle event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProcessEvent {
    /// A record moved to a new status.
    StatusChanged(ProcessStateInfo),

    /// A record was removed from the registry.
    #[serde(rename_all = "camelCase")]
    Removed { process_id: String },
}

impl ProcessEvent {
    /// ID of the process the event refers to.
    pub fn process_id(&self) -> &str {
        match self {
            Self::StatusChanged(info) => &info.process_id,
            Self::Removed { process_id } => process_id,
        }
    }

    /// New status, for status-change events.
    pub const fn status(&self) -> Option<ProcessStatus> {
        match self {
            Self::StatusChanged(info) => Some(info.status),
            Self::Removed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = ProcessEvent::StatusChanged(ProcessStateInfo {
            process_id: "web".into(),
            status: ProcessStatus::Running,
            pid: Some(1234),
            restart_count: 0,
            updated_at: Utc::now(),
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"statusChanged\""));
        assert!(json.contains("\"processId\":\"web\""));
        assert!(json.contains("\"pid\":1234"));
    }

    #[test]
    fn test_removed_serialization() {
        let event = ProcessEvent::Removed {
            process_id: "web".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"removed","processId":"web"}"#);
        assert_eq!(event.status(), None);
    }
}
