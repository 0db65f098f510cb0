//! Registry state owned by the supervisor.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use prochub_core::{Definition, ProcessEvent, ProcessSnapshot, ProcessStateInfo, ProcessStatus};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Handles for one run of a process, or for one pending restart.
///
/// Every task belonging to the run is spawned on `tracker` and observes
/// `cancel`. `stop_requested` is set under the registry lock before `cancel`
/// fires, so an exit can be classified as intentional without racing.
#[derive(Debug, Clone)]
pub(crate) struct ActiveRun {
    pub generation: u64,
    pub cancel: CancellationToken,
    pub stop_requested: Arc<AtomicBool>,
    pub tracker: TaskTracker,
}

impl ActiveRun {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            cancel: CancellationToken::new(),
            stop_requested: Arc::new(AtomicBool::new(false)),
            tracker: TaskTracker::new(),
        }
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub(crate) struct ProcessRecord {
    pub definition: Definition,
    pub status: ProcessStatus,
    pub pid: Option<u32>,
    pub started_at: Option<DateTime<Utc>>,
    pub restart_count: u32,
    pub last_exit_code: Option<i32>,
    pub last_error: Option<String>,
    /// Present while a run or a pending restart exists.
    pub run: Option<ActiveRun>,
}

impl ProcessRecord {
    pub const fn new(definition: Definition) -> Self {
        Self {
            definition,
            status: ProcessStatus::Stopped,
            pid: None,
            started_at: None,
            restart_count: 0,
            last_exit_code: None,
            last_error: None,
            run: None,
        }
    }

    /// Whether `generation` identifies the run currently attached.
    pub fn is_current(&self, generation: u64) -> bool {
        self.run.as_ref().is_some_and(|r| r.generation == generation)
    }

    /// Flag the attached run as stopping and cancel it.
    ///
    /// Returns the run's join barrier, or `None` when nothing is attached.
    pub fn request_stop(&mut self) -> Option<TaskTracker> {
        let run = self.run.as_ref()?;
        run.stop_requested.store(true, Ordering::SeqCst);
        run.cancel.cancel();
        let tracker = run.tracker.clone();
        self.status = ProcessStatus::Stopping;
        Some(tracker)
    }

    pub fn snapshot(&self) -> ProcessSnapshot {
        ProcessSnapshot {
            id: self.definition.id.clone(),
            name: self.definition.display_name().to_string(),
            status: self.status,
            pid: self.pid,
            started_at: self.started_at,
            restart_count: self.restart_count,
            last_exit_code: self.last_exit_code,
            last_error: self.last_error.clone(),
        }
    }

    pub fn status_event(&self) -> ProcessEvent {
        ProcessEvent::StatusChanged(ProcessStateInfo::from(&self.snapshot()))
    }
}

/// Records keyed by ID, plus registration order for listing.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    order: Vec<String>,
    records: HashMap<String, ProcessRecord>,
}

impl Registry {
    pub fn get(&self, id: &str) -> Option<&ProcessRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ProcessRecord> {
        self.records.get_mut(id)
    }

    /// Insert a new record or replace an existing one, keeping its position.
    pub fn insert(&mut self, record: ProcessRecord) -> &mut ProcessRecord {
        match self.records.entry(record.definition.id.clone()) {
            Entry::Occupied(mut slot) => {
                slot.insert(record);
                slot.into_mut()
            }
            Entry::Vacant(slot) => {
                self.order.push(slot.key().clone());
                slot.insert(record)
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<ProcessRecord> {
        let record = self.records.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(record)
    }

    /// Records in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ProcessRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }
}
