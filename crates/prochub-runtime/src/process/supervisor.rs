//! Process supervisor: owns the registered definitions and drives their runs.
//!
//! The registry sits behind a `std::sync::Mutex` that is only held for state
//! transitions, never across an `.await` or process I/O. Operations that must
//! wait for a run to end (`stop`, `remove`, re-`register`) cancel the run and
//! then await its task tracker outside the lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use futures_util::future::join_all;
use prochub_core::{
    Definition, LogSinkPort, ProcessEvent, ProcessSnapshot, ProcessStatus, SupervisorError,
};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::broadcaster::ProcessEventBroadcaster;
use super::config::SupervisorConfig;
use super::lifecycle::launch;
use super::record::{ActiveRun, ProcessRecord, Registry};
use super::stream::SinkSlot;

/// State shared between the supervisor handle and its background tasks.
pub(crate) struct Shared {
    pub config: SupervisorConfig,
    pub sink: SinkSlot,
    registry: Mutex<Registry>,
    events: ProcessEventBroadcaster,
    generations: AtomicU64,
}

impl Shared {
    pub fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn emit(&self, record: &ProcessRecord) {
        self.events.broadcast(record.status_event());
    }
}

/// Result of a successful start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartOutcome {
    /// A new run was spawned.
    Started,
    /// The process was already starting or running; nothing changed.
    AlreadyRunning,
}

/// Outcome of [`Supervisor::stop_all`].
#[derive(Debug, Default)]
pub struct StopAllSummary {
    /// IDs that reached a terminal state.
    pub stopped: Vec<String>,
    /// IDs that did not, with the reason.
    pub failed: Vec<(String, SupervisorError)>,
}

impl StopAllSummary {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Supervisor of local OS processes.
///
/// Cheap to clone; clones share the same registry.
///
/// # Example
///
/// ```ignore
/// let supervisor = Supervisor::new(SupervisorConfig::default());
/// supervisor.register(Definition::new("web", "Web", "node").with_args(["app.js"])).await?;
/// supervisor.start("web").await?;
/// println!("{:?}", supervisor.get("web")?.status);
/// supervisor.stop_all().await;
/// ```
#[derive(Clone)]
pub struct Supervisor {
    shared: Arc<Shared>,
}

impl Supervisor {
    #[must_use]
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                sink: Arc::new(OnceLock::new()),
                registry: Mutex::new(Registry::default()),
                events: ProcessEventBroadcaster::new(),
                generations: AtomicU64::new(0),
            }),
        }
    }

    /// Create a supervisor with its log sink already installed.
    #[must_use]
    pub fn with_log_sink(config: SupervisorConfig, sink: Arc<dyn LogSinkPort>) -> Self {
        let supervisor = Self::new(config);
        let _ = supervisor.shared.sink.set(sink);
        supervisor
    }

    /// Install the single log sink. Lines captured before this are discarded.
    pub fn set_log_sink(&self, sink: Arc<dyn LogSinkPort>) -> Result<(), SupervisorError> {
        self.shared
            .sink
            .set(sink)
            .map_err(|_| SupervisorError::LogSinkAlreadySet)
    }

    /// Register a definition, replacing any existing one with the same ID.
    ///
    /// A replaced definition's run is fully torn down first. Never starts the
    /// process.
    pub async fn register(&self, definition: Definition) -> Result<(), SupervisorError> {
        self.install(definition, false).await
    }

    /// Replace the definition of an already registered process.
    pub async fn update(&self, definition: Definition) -> Result<(), SupervisorError> {
        self.install(definition, true).await
    }

    async fn install(&self, definition: Definition, must_exist: bool) -> Result<(), SupervisorError> {
        definition
            .validate()
            .map_err(SupervisorError::InvalidDefinition)?;
        let id = definition.id.clone();

        self.quiesce(&id, must_exist, |registry| {
            let replaced = registry.get(&id).is_some();
            let record = registry.insert(ProcessRecord::new(definition));
            debug!(process_id = %id, replaced, "Registered process");
            self.shared.emit(record);
        })
        .await
    }

    /// Stop and forget a process.
    pub async fn remove(&self, id: &str) -> Result<(), SupervisorError> {
        self.quiesce(id, true, |registry| {
            registry.remove(id);
            info!(process_id = %id, "Removed process");
            self.shared.events.broadcast(ProcessEvent::Removed {
                process_id: id.to_string(),
            });
        })
        .await
    }

    /// Start a process.
    ///
    /// Starting a process that is already starting or running is a no-op. A
    /// pending automatic restart is superseded and the restart counter reset.
    pub async fn start(&self, id: &str) -> Result<StartOutcome, SupervisorError> {
        let (definition, run) = loop {
            let tracker = {
                let mut registry = self.shared.lock();
                let record = registry
                    .get_mut(id)
                    .ok_or_else(|| SupervisorError::NotFound(id.to_string()))?;

                match record.status {
                    ProcessStatus::Running | ProcessStatus::Starting => {
                        return Ok(StartOutcome::AlreadyRunning);
                    }
                    ProcessStatus::Stopping => record.run.as_ref().map(|r| r.tracker.clone()),
                    ProcessStatus::Stopped
                    | ProcessStatus::Crashed
                    | ProcessStatus::RestartWaiting => {
                        if let Some(pending) = record.run.take() {
                            debug!(process_id = %id, "Superseding pending restart");
                            pending.cancel.cancel();
                        }
                        let run = ActiveRun::new(self.shared.next_generation());
                        record.run = Some(run.clone());
                        record.status = ProcessStatus::Starting;
                        record.restart_count = 0;
                        record.last_error = None;
                        self.shared.emit(record);
                        break (record.definition.clone(), run);
                    }
                }
            };

            match tracker {
                Some(tracker) => tracker.wait().await,
                None => tokio::task::yield_now().await,
            }
        };

        launch(&self.shared, &definition, run).map(|()| StartOutcome::Started)
    }

    /// Stop a process and wait until its run has fully ended.
    ///
    /// Stopping a stopped or crashed process is a no-op. A pending automatic
    /// restart is cancelled.
    pub async fn stop(&self, id: &str) -> Result<(), SupervisorError> {
        let tracker = {
            let mut registry = self.shared.lock();
            let record = registry
                .get_mut(id)
                .ok_or_else(|| SupervisorError::NotFound(id.to_string()))?;
            let already_stopping = record.status == ProcessStatus::Stopping;
            let tracker = record.request_stop();
            if tracker.is_some() && !already_stopping {
                info!(process_id = %id, pid = ?record.pid, "Stopping process");
                self.shared.emit(record);
            }
            tracker
        };

        if let Some(tracker) = tracker {
            tracker.wait().await;
        }
        Ok(())
    }

    /// Stop then start a process.
    pub async fn restart(&self, id: &str) -> Result<StartOutcome, SupervisorError> {
        self.stop(id).await?;
        self.start(id).await
    }

    /// Stop every process with an active run, bounded by the configured timeout.
    ///
    /// Always completes; processes still running when the timeout hits are
    /// reported as [`SupervisorError::TerminationTimeout`].
    pub async fn stop_all(&self) -> StopAllSummary {
        let ids: Vec<String> = self
            .shared
            .lock()
            .iter()
            .filter(|r| r.run.is_some())
            .map(|r| r.definition.id.clone())
            .collect();

        let mut summary = StopAllSummary::default();
        if ids.is_empty() {
            return summary;
        }

        let waited = self.shared.config.stop_all_timeout;
        info!(count = ids.len(), timeout = ?waited, "Stopping all processes");
        let results = timeout(waited, join_all(ids.iter().map(|id| self.stop(id)))).await;

        if let Ok(results) = results {
            for (id, result) in ids.into_iter().zip(results) {
                match result {
                    Ok(()) => summary.stopped.push(id),
                    // Removed concurrently
                    Err(e) if e.is_not_found() => {}
                    Err(e) => summary.failed.push((id, e)),
                }
            }
            return summary;
        }

        let registry = self.shared.lock();
        for id in ids {
            match registry.get(&id) {
                Some(record) if !record.status.is_terminal() => {
                    warn!(process_id = %id, status = %record.status, "Process did not stop in time");
                    let error = SupervisorError::TerminationTimeout {
                        id: id.clone(),
                        waited,
                    };
                    summary.failed.push((id, error));
                }
                Some(_) => summary.stopped.push(id),
                None => {}
            }
        }
        summary
    }

    /// Snapshots of every registered process, in registration order.
    pub fn list(&self) -> Vec<ProcessSnapshot> {
        self.shared
            .lock()
            .iter()
            .map(ProcessRecord::snapshot)
            .collect()
    }

    pub fn get(&self, id: &str) -> Result<ProcessSnapshot, SupervisorError> {
        self.shared
            .lock()
            .get(id)
            .map(ProcessRecord::snapshot)
            .ok_or_else(|| SupervisorError::NotFound(id.to_string()))
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<ProcessEvent> {
        self.shared.events.subscribe()
    }

    /// Tear down the run attached to `id` (if any), then apply `finish` under
    /// the same lock acquisition that observed the record idle.
    async fn quiesce<T>(
        &self,
        id: &str,
        must_exist: bool,
        finish: impl FnOnce(&mut Registry) -> T,
    ) -> Result<T, SupervisorError> {
        loop {
            let tracker = {
                let mut registry = self.shared.lock();
                let Some(record) = registry.get_mut(id) else {
                    if must_exist {
                        return Err(SupervisorError::NotFound(id.to_string()));
                    }
                    return Ok(finish(&mut registry));
                };

                let already_stopping = record.status == ProcessStatus::Stopping;
                match record.request_stop() {
                    Some(tracker) => {
                        if !already_stopping {
                            self.shared.emit(record);
                        }
                        tracker
                    }
                    None => return Ok(finish(&mut registry)),
                }
            };
            tracker.wait().await;
        }
    }
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("config", &self.shared.config)
            .field("sink_installed", &self.shared.sink.get().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supervisor() -> Supervisor {
        Supervisor::new(SupervisorConfig::default())
    }

    #[tokio::test]
    async fn test_register_validates() {
        let sup = supervisor();
        let err = sup
            .register(Definition::new("", "nameless", "true"))
            .await
            .unwrap_err();
        assert!(matches!(err, SupervisorError::InvalidDefinition(_)));

        let err = sup
            .register(Definition::new("web", "Web", " "))
            .await
            .unwrap_err();
        assert!(matches!(err, SupervisorError::InvalidDefinition(_)));
        assert!(sup.list().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let sup = supervisor();
        assert!(sup.start("nope").await.unwrap_err().is_not_found());
        assert!(sup.stop("nope").await.unwrap_err().is_not_found());
        assert!(sup.remove("nope").await.unwrap_err().is_not_found());
        assert!(sup.get("nope").unwrap_err().is_not_found());
        assert!(
            sup.update(Definition::new("nope", "", "true"))
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_register_lists_in_order_and_stays_stopped() {
        let sup = supervisor();
        for id in ["b", "a", "c"] {
            sup.register(Definition::new(id, "", "true").with_auto_start(true))
                .await
                .unwrap();
        }
        // Re-registering keeps the original position
        sup.register(Definition::new("a", "Renamed", "true"))
            .await
            .unwrap();

        let list = sup.list();
        let ids: Vec<&str> = list.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c"]);
        assert!(list.iter().all(|s| s.status == ProcessStatus::Stopped));
        assert_eq!(list[1].name, "Renamed");
    }

    #[tokio::test]
    async fn test_stop_is_noop_when_stopped() {
        let sup = supervisor();
        sup.register(Definition::new("web", "", "true")).await.unwrap();
        sup.stop("web").await.unwrap();
        assert_eq!(sup.get("web").unwrap().status, ProcessStatus::Stopped);
    }

    #[tokio::test]
    async fn test_log_sink_is_set_once() {
        let sup = supervisor();
        sup.set_log_sink(Arc::new(prochub_core::NoopLogSink)).unwrap();
        assert!(matches!(
            sup.set_log_sink(Arc::new(prochub_core::NoopLogSink)),
            Err(SupervisorError::LogSinkAlreadySet)
        ));

        let sup = Supervisor::with_log_sink(
            SupervisorConfig::default(),
            Arc::new(prochub_core::NoopLogSink),
        );
        assert!(sup.set_log_sink(Arc::new(prochub_core::NoopLogSink)).is_err());
    }

    #[tokio::test]
    async fn test_spawn_failure_crashes() {
        let sup = supervisor();
        let mut events = sup.subscribe();
        sup.register(Definition::new("ghost", "", "/nonexistent/prochub-missing-binary"))
            .await
            .unwrap();

        let err = sup.start("ghost").await.unwrap_err();
        assert!(matches!(err, SupervisorError::SpawnFailure { ref id, .. } if id == "ghost"));

        let snap = sup.get("ghost").unwrap();
        assert_eq!(snap.status, ProcessStatus::Crashed);
        assert!(snap.last_error.is_some());
        assert!(snap.pid.is_none());

        let statuses: Vec<ProcessStatus> = std::iter::from_fn(|| events.try_recv().ok())
            .filter_map(|e| e.status())
            .collect();
        assert_eq!(
            statuses,
            [
                ProcessStatus::Stopped,
                ProcessStatus::Starting,
                ProcessStatus::Crashed
            ]
        );
    }

    #[tokio::test]
    async fn test_stop_all_with_nothing_running() {
        let sup = supervisor();
        sup.register(Definition::new("web", "", "true")).await.unwrap();
        let summary = sup.stop_all().await;
        assert!(summary.is_clean());
        assert!(summary.stopped.is_empty());
    }
}
