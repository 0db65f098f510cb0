//! Log sink port for process output capture.
//!
//! This port lets the runtime deliver captured lines without depending on any
//! particular storage or display layer.

use crate::logs::LogStream;

/// Receiver of every captured output line.
///
/// Implementations are invoked concurrently from the output pumps of many
/// processes, and from both pumps of the same process, so they must be
/// thread-safe. Calls for one stream of one process arrive in order.
pub trait LogSinkPort: Send + Sync {
    /// Append a log line from a supervised process.
    ///
    /// # Arguments
    ///
    /// * `process_id` - ID of the definition that produced the line
    /// * `stream` - Pipe the line was read from
    /// * `line` - The log line content (without trailing newline)
    fn append(&self, process_id: &str, stream: LogStream, line: String);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogSink;

impl LogSinkPort for NoopLogSink {
    fn append(&self, _process_id: &str, _stream: LogStream, _line: String) {}
}
