//! Output pumps (non-UTF8-safe).
//!
//! Supervised programs can emit non-UTF8 bytes on stdout/stderr. Using
//! `BufReader::lines()` would terminate the pump on invalid UTF-8, so lines are
//! read as bytes and decoded lossily.

use std::sync::{Arc, OnceLock};

use prochub_core::{LogSinkPort, LogStream};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::debug;

/// Slot holding the supervisor's single log sink, filled at most once.
pub type SinkSlot = Arc<OnceLock<Arc<dyn LogSinkPort>>>;

/// Spawn a pump forwarding every line of `stream` to the installed sink.
///
/// The pump ends on EOF, on a read error, or when `cancel` fires. Lines read
/// while no sink is installed are discarded.
pub fn spawn_pump(
    tracker: &TaskTracker,
    stream: impl AsyncRead + Unpin + Send + 'static,
    process_id: Arc<str>,
    kind: LogStream,
    sink: SinkSlot,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tracker.spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);

        loop {
            buf.clear();
            let read = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(process_id = %process_id, stream = %kind, "Output pump cancelled");
                    break;
                }
                read = reader.read_until(b'\n', &mut buf) => read,
            };

            match read {
                Ok(0) => break, // EOF
                Ok(_) => {
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                        if buf.last() == Some(&b'\r') {
                            buf.pop();
                        }
                    }

                    if let Some(sink) = sink.get() {
                        let line = String::from_utf8_lossy(&buf).into_owned();
                        sink.append(&process_id, kind, line);
                    }
                }
                Err(e) => {
                    debug!(process_id = %process_id, stream = %kind, error = %e, "Output pump exiting due to read error");
                    break;
                }
            }
        }

        debug!(process_id = %process_id, stream = %kind, "Output pump exiting");
    })
}
