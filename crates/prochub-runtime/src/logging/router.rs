//! Log sink that fans captured lines out to per-process storage.
//!
//! Every line is pushed to the process's [`StreamHub`], broadcast to live
//! subscribers, and appended to its [`RollingLogStore`]. Store failures are
//! logged and remembered but never stop capture into the hub.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use prochub_core::{LogEntry, LogSinkPort, LogStoreError, LogStream, process_log_dir};
use tokio::sync::broadcast;
use tracing::warn;

use super::hub::StreamHub;
use super::rolling::RollingLogStore;

/// Broadcast channel capacity for live log lines (all processes).
const LIVE_CHANNEL_CAPACITY: usize = 1000;

/// Retention settings shared by every process the router serves.
#[derive(Debug, Clone)]
pub struct LogRouterConfig {
    /// Directory under which each process gets `<log_root>/<id>`.
    pub log_root: PathBuf,
    pub max_log_lines: usize,
    pub max_log_files: usize,
    pub hub_capacity: usize,
}

/// A captured line tagged with its process, as delivered to live subscribers.
#[derive(Debug, Clone)]
pub struct LiveLogLine {
    pub process_id: String,
    pub entry: LogEntry,
}

/// Log state owned by the router for one process.
#[derive(Debug)]
struct ProcessLogs {
    hub: Arc<StreamHub>,
    store: Mutex<RollingLogStore>,
    write_failures: AtomicU64,
    last_write_error: Mutex<Option<String>>,
}

impl ProcessLogs {
    fn new(dir: PathBuf, config: &LogRouterConfig) -> Self {
        Self {
            hub: Arc::new(StreamHub::new(config.hub_capacity)),
            store: Mutex::new(RollingLogStore::new(
                dir,
                config.max_log_lines,
                config.max_log_files,
            )),
            write_failures: AtomicU64::new(0),
            last_write_error: Mutex::new(None),
        }
    }

    fn record(&self, process_id: &str, entry: &LogEntry) {
        let result = self
            .store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .append(entry);

        if let Err(e) = result {
            let failures = self.write_failures.fetch_add(1, Ordering::Relaxed) + 1;
            // Warn once per process; later failures are only counted
            if failures == 1 {
                warn!(process_id = %process_id, error = %e, "Failed to write process log");
            }
            *self
                .last_write_error
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(e.to_string());
        }
    }
}

/// Per-process log fan-out installed as the supervisor's sink.
#[derive(Debug)]
pub struct LogRouter {
    config: LogRouterConfig,
    processes: RwLock<HashMap<String, Arc<ProcessLogs>>>,
    live_tx: broadcast::Sender<LiveLogLine>,
}

impl LogRouter {
    pub fn new(config: LogRouterConfig) -> Self {
        let (live_tx, _) = broadcast::channel(LIVE_CHANNEL_CAPACITY);
        Self {
            config,
            processes: RwLock::new(HashMap::new()),
            live_tx,
        }
    }

    /// Durable log directory for a process.
    pub fn process_dir(&self, process_id: &str) -> PathBuf {
        process_log_dir(&self.config.log_root, process_id)
    }

    /// Create the log state for a process ahead of its first line.
    pub fn ensure_process(&self, process_id: &str) {
        self.logs_for(process_id);
    }

    fn logs_for(&self, process_id: &str) -> Arc<ProcessLogs> {
        if let Some(logs) = self
            .processes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(process_id)
        {
            return Arc::clone(logs);
        }

        let mut processes = self
            .processes
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(processes.entry(process_id.to_string()).or_insert_with(|| {
            Arc::new(ProcessLogs::new(self.process_dir(process_id), &self.config))
        }))
    }

    /// Drop in-memory log state for a process. Files on disk are kept.
    pub fn remove_process(&self, process_id: &str) -> bool {
        self.processes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(process_id)
            .is_some()
    }

    /// Recent entries from the process's stream hub, oldest first.
    pub fn recent(&self, process_id: &str) -> Vec<LogEntry> {
        self.get(process_id)
            .map(|logs| logs.hub.snapshot())
            .unwrap_or_default()
    }

    /// Subscribe to every captured line, across all processes.
    pub fn subscribe(&self) -> broadcast::Receiver<LiveLogLine> {
        self.live_tx.subscribe()
    }

    /// Most recent durable write failure for a process, if any.
    pub fn last_write_error(&self, process_id: &str) -> Option<String> {
        self.get(process_id).and_then(|logs| {
            logs.last_write_error
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        })
    }

    /// Number of durable write failures for a process.
    pub fn write_failures(&self, process_id: &str) -> u64 {
        self.get(process_id)
            .map_or(0, |logs| logs.write_failures.load(Ordering::Relaxed))
    }

    /// Durable history of a process, oldest first.
    pub fn read_history(&self, process_id: &str) -> Result<Vec<String>, LogStoreError> {
        self.store_for(process_id).read_lines()
    }

    /// Export the durable history of a process to a file.
    pub fn export(&self, process_id: &str, dest: &Path) -> Result<usize, LogStoreError> {
        self.store_for(process_id).export_to(dest)
    }

    // Reads go straight to disk so they also work for processes never started here.
    fn store_for(&self, process_id: &str) -> RollingLogStore {
        RollingLogStore::new(
            self.process_dir(process_id),
            self.config.max_log_lines,
            self.config.max_log_files,
        )
    }

    fn get(&self, process_id: &str) -> Option<Arc<ProcessLogs>> {
        self.processes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(process_id)
            .cloned()
    }
}

impl LogSinkPort for LogRouter {
    fn append(&self, process_id: &str, stream: LogStream, line: String) {
        let entry = LogEntry::now(stream, line);
        let logs = self.logs_for(process_id);

        logs.hub.push(entry.clone());
        if self.live_tx.receiver_count() > 0 {
            let _ = self.live_tx.send(LiveLogLine {
                process_id: process_id.to_string(),
                entry: entry.clone(),
            });
        }
        logs.record(process_id, &entry);
    }
}
