//! Tasks that make up a run: spawn, exit watcher, and restart timer.
//!
//! All of them check the run generation under the registry lock before
//! writing to a record, so a task from a superseded run never clobbers the
//! state of a newer one.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::join_all;
use prochub_core::{Definition, LogStream, ProcessStatus, SupervisorError};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::record::ActiveRun;
use super::restart::{ExitInfo, RestartAction, decide};
use super::shutdown::{describe_signal, terminate_child};
use super::stream::spawn_pump;
use super::supervisor::Shared;

fn build_command(definition: &Definition) -> Command {
    let mut cmd = Command::new(&definition.command);
    cmd.args(&definition.args)
        .envs(&definition.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &definition.working_dir {
        cmd.current_dir(dir);
    }
    cmd
}

/// Spawn the OS process for a record already moved to `Starting`.
///
/// On success the pumps and the exit watcher are attached to the run's
/// tracker, which is then closed so that it can act as the join barrier.
pub(super) fn launch(
    shared: &Arc<Shared>,
    definition: &Definition,
    run: ActiveRun,
) -> Result<(), SupervisorError> {
    let id = definition.id.clone();
    let spawned = build_command(definition).spawn();

    let mut child = {
        let mut registry = shared.lock();
        let Some(record) = registry
            .get_mut(&id)
            .filter(|r| r.is_current(run.generation))
        else {
            // Superseded while spawning; kill_on_drop takes care of the child
            run.tracker.close();
            return Ok(());
        };

        match spawned {
            Err(e) => {
                let reason = e.to_string();
                warn!(process_id = %id, command = %definition.command, error = %reason, "Failed to spawn process");
                record.status = if run.stop_requested() {
                    ProcessStatus::Stopped
                } else {
                    ProcessStatus::Crashed
                };
                record.pid = None;
                record.last_error = Some(format!("failed to spawn: {reason}"));
                record.run = None;
                shared.emit(record);
                run.tracker.close();
                return Err(SupervisorError::SpawnFailure { id, reason });
            }
            Ok(child) => {
                record.pid = child.id();
                record.started_at = Some(Utc::now());
                record.last_exit_code = None;
                if !run.stop_requested() {
                    record.status = ProcessStatus::Running;
                }
                info!(process_id = %id, pid = ?record.pid, command = %definition.command, "Process started");
                shared.emit(record);
                child
            }
        }
    };

    let process_id: Arc<str> = Arc::from(id.as_str());
    let drain = CancellationToken::new();
    let mut pumps = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        pumps.push(spawn_pump(
            &run.tracker,
            stdout,
            Arc::clone(&process_id),
            LogStream::Stdout,
            Arc::clone(&shared.sink),
            drain.clone(),
        ));
    }
    if let Some(stderr) = child.stderr.take() {
        pumps.push(spawn_pump(
            &run.tracker,
            stderr,
            process_id,
            LogStream::Stderr,
            Arc::clone(&shared.sink),
            drain.clone(),
        ));
    }

    let tracker = run.tracker.clone();
    tracker.spawn(watch(Arc::clone(shared), id, child, run, pumps, drain));
    tracker.close();
    Ok(())
}

/// Wait for the child to exit (or terminate it on cancellation), then settle
/// the record according to its restart policy.
async fn watch(
    shared: Arc<Shared>,
    id: String,
    mut child: Child,
    run: ActiveRun,
    mut pumps: Vec<JoinHandle<()>>,
    drain: CancellationToken,
) {
    let config = shared.config;
    let stability = sleep(config.stability_window);
    tokio::pin!(stability);
    let mut stable = false;

    let exit = loop {
        tokio::select! {
            () = run.cancel.cancelled() => {
                break match terminate_child(&mut child, config.stop_grace_period).await {
                    Ok(termination) => {
                        if termination.forced {
                            warn!(process_id = %id, grace = ?config.stop_grace_period, "Process ignored SIGTERM, killed");
                        }
                        Ok(termination.status)
                    }
                    Err(e) => Err(e),
                };
            }
            status = child.wait() => break status,
            () = &mut stability, if !stable => {
                stable = true;
                mark_stable(&shared, &id, run.generation);
            }
        }
    };

    // A grandchild may hold the pipes open; do not wait on it forever
    if timeout(config.pump_drain, join_all(pumps.iter_mut())).await.is_err() {
        debug!(process_id = %id, "Output pumps still open after exit, cancelling");
        drain.cancel();
        // Handles already polled to completion must not be awaited again
        for pump in pumps.into_iter().filter(|p| !p.is_finished()) {
            let _ = pump.await;
        }
    }

    settle(&shared, &id, &run, &exit);
}

fn mark_stable(shared: &Shared, id: &str, generation: u64) {
    let mut registry = shared.lock();
    if let Some(record) = registry.get_mut(id).filter(|r| {
        r.is_current(generation) && r.status == ProcessStatus::Running && r.restart_count > 0
    }) {
        debug!(process_id = %id, restarts = record.restart_count, "Run is stable, resetting restart counter");
        record.restart_count = 0;
        shared.emit(record);
    }
}

fn settle(shared: &Arc<Shared>, id: &str, run: &ActiveRun, exit: &io::Result<ExitStatus>) {
    let mut registry = shared.lock();
    let Some(record) = registry
        .get_mut(id)
        .filter(|r| r.is_current(run.generation))
    else {
        debug!(process_id = %id, "Ignoring exit of superseded run");
        return;
    };

    let intentional = run.stop_requested();
    let (code, reason) = match exit {
        Ok(status) => (status.code(), describe_signal(*status)),
        Err(e) => (None, Some(format!("failed to wait for process: {e}"))),
    };
    record.pid = None;
    record.last_exit_code = code;
    if !intentional {
        if let Some(reason) = reason {
            record.last_error = Some(reason);
        } else if code != Some(0) {
            record.last_error = code.map(|c| format!("exited with code {c}"));
        }
    }

    let action = decide(
        record.definition.restart_policy,
        record.definition.max_restarts,
        record.restart_count,
        ExitInfo { code, intentional },
    );
    match action {
        RestartAction::Settle(status) => {
            record.status = status;
            record.run = None;
            if status == ProcessStatus::Crashed {
                warn!(process_id = %id, exit_code = ?code, restarts = record.restart_count, "Process crashed");
            } else {
                info!(process_id = %id, exit_code = ?code, "Process stopped");
            }
        }
        RestartAction::Restart => {
            record.restart_count += 1;
            record.status = ProcessStatus::RestartWaiting;
            let delay = record.definition.restart_delay;
            let pending = ActiveRun::new(shared.next_generation());
            record.run = Some(pending.clone());
            info!(
                process_id = %id,
                exit_code = ?code,
                attempt = record.restart_count,
                delay_ms = delay.as_millis(),
                "Scheduling restart"
            );

            let tracker = pending.tracker.clone();
            tracker.spawn(restart_after(Arc::clone(shared), id.to_string(), delay, pending));
            tracker.close();
        }
    }
    shared.emit(record);
}

/// Restart timer of a pending run. Cancelled by a stop or a manual start.
async fn restart_after(shared: Arc<Shared>, id: String, delay: Duration, run: ActiveRun) {
    tokio::select! {
        () = run.cancel.cancelled() => {}
        () = sleep(delay) => {}
    }

    let definition = {
        let mut registry = shared.lock();
        let Some(record) = registry
            .get_mut(&id)
            .filter(|r| r.is_current(run.generation))
        else {
            // Superseded by a manual start, or removed
            return;
        };

        if run.stop_requested() {
            info!(process_id = %id, "Pending restart cancelled");
            record.status = ProcessStatus::Stopped;
            record.run = None;
            shared.emit(record);
            return;
        }

        record.status = ProcessStatus::Starting;
        shared.emit(record);
        record.definition.clone()
    };

    if let Err(e) = launch(&shared, &definition, run) {
        debug!(process_id = %id, error = %e, "Restart attempt failed");
    }
}
