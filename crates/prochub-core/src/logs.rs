//! Log entry model shared by output capture, the stream hub and durable storage.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Which output pipe a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    Stdout,
    Stderr,
}

impl LogStream {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl fmt::Display for LogStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single captured output line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the line was read.
    pub timestamp: DateTime<Utc>,
    /// Source pipe.
    pub stream: LogStream,
    /// Line content without trailing newline.
    pub line: String,
}

impl LogEntry {
    /// Create a new log entry with the current timestamp.
    pub fn now(stream: LogStream, line: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            stream,
            line: line.into(),
        }
    }

    /// Render the entry as a single line of durable log text.
    pub fn to_log_line(&self) -> String {
        format!(
            "{} [{}] {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.stream,
            self.line
        )
    }
}
