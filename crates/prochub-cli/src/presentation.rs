//! Formatting helpers for terminal output.

use chrono::{DateTime, Local, Utc};
use prochub_core::{ProcessEvent, ProcessSnapshot, SupervisorError};
use prochub_runtime::{LiveLogLine, StopAllSummary};

/// Truncates a string to a maximum number of characters, adding "..." if needed.
///
/// # Examples
///
/// ```rust
/// use prochub_cli::presentation::truncate_string;
///
/// assert_eq!(truncate_string("Hello", 10), "Hello");
/// assert_eq!(truncate_string("Hello World", 8), "Hello...");
/// ```
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Print a horizontal separator line.
pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

fn local_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// One captured line as shown by `prochub run`.
pub fn format_live_line(line: &LiveLogLine) -> String {
    format!(
        "{} {:<12} {} | {}",
        local_time(line.entry.timestamp),
        truncate_string(&line.process_id, 12),
        line.entry.stream,
        line.entry.line
    )
}

/// One lifecycle event as shown by `prochub run`.
pub fn format_event(event: &ProcessEvent) -> String {
    match event {
        ProcessEvent::StatusChanged(info) => {
            let mut out = format!(
                "{} [{}] -> {}",
                local_time(info.updated_at),
                info.process_id,
                info.status
            );
            if let Some(pid) = info.pid {
                out.push_str(&format!(" (pid {pid})"));
            }
            if info.restart_count > 0 {
                out.push_str(&format!(" restarts={}", info.restart_count));
            }
            out
        }
        ProcessEvent::Removed { process_id } => format!("[{process_id}] removed"),
    }
}

fn format_uptime(uptime: chrono::Duration) -> String {
    let secs = uptime.num_seconds().max(0);
    let (hours, minutes, seconds) = (secs / 3600, secs % 3600 / 60, secs % 60);
    if hours > 0 {
        format!("{hours}h{minutes:02}m{seconds:02}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}

/// One row of the status report printed when `prochub run` is interrupted.
pub fn format_status_line(snapshot: &ProcessSnapshot, now: DateTime<Utc>) -> String {
    let mut out = format!(
        "{:<12} {:<16}",
        truncate_string(&snapshot.id, 12),
        snapshot.status.as_str()
    );
    if let Some(uptime) = snapshot.uptime(now) {
        out.push_str(&format!(" up {}", format_uptime(uptime)));
    }
    if snapshot.restart_count > 0 {
        out.push_str(&format!(" restarts={}", snapshot.restart_count));
    }
    if let Some(error) = &snapshot.last_error {
        out.push_str(&format!(" ({error})"));
    }
    out.trim_end().to_string()
}

/// Human-readable report of a shutdown.
pub fn format_stop_summary(summary: &StopAllSummary) -> Vec<String> {
    let mut lines = Vec::new();
    if !summary.stopped.is_empty() {
        lines.push(format!("Stopped: {}", summary.stopped.join(", ")));
    }
    for (id, error) in &summary.failed {
        let reason = match error {
            SupervisorError::TerminationTimeout { waited, .. } => {
                format!("still running after {}ms", waited.as_millis())
            }
            other => other.to_string(),
        };
        lines.push(format!("Failed to stop {id}: {reason}"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use prochub_core::{ProcessStateInfo, ProcessStatus};
    use std::time::Duration;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate_string("héllo wörld", 8), "héllo...");
        assert_eq!(truncate_string("abc", 3), "abc");
    }

    #[test]
    fn test_format_event() {
        let event = ProcessEvent::StatusChanged(ProcessStateInfo {
            process_id: "web".into(),
            status: ProcessStatus::Running,
            pid: Some(42),
            restart_count: 2,
            updated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        });
        let text = format_event(&event);
        assert!(text.ends_with("[web] -> running (pid 42) restarts=2"), "{text}");
    }

    #[test]
    fn test_format_status_line() {
        let started = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut snap = ProcessSnapshot {
            id: "web".into(),
            name: "Web".into(),
            status: ProcessStatus::Running,
            pid: Some(42),
            started_at: Some(started),
            restart_count: 1,
            last_exit_code: None,
            last_error: None,
        };
        let now = started + chrono::Duration::seconds(3723);
        assert_eq!(
            format_status_line(&snap, now),
            "web          running          up 1h02m03s restarts=1"
        );

        snap.status = ProcessStatus::Crashed;
        snap.restart_count = 0;
        snap.last_error = Some("exited with code 1".into());
        assert_eq!(
            format_status_line(&snap, now),
            "web          crashed          (exited with code 1)"
        );

        snap.last_error = None;
        snap.status = ProcessStatus::Stopped;
        assert_eq!(format_status_line(&snap, now), "web          stopped");
    }

    #[test]
    fn test_format_stop_summary() {
        let summary = StopAllSummary {
            stopped: vec!["a".into(), "b".into()],
            failed: vec![(
                "c".into(),
                SupervisorError::TerminationTimeout {
                    id: "c".into(),
                    waited: Duration::from_secs(10),
                },
            )],
        };
        assert_eq!(
            format_stop_summary(&summary),
            ["Stopped: a, b", "Failed to stop c: still running after 10000ms"]
        );
    }
}
