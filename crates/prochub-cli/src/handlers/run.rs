//! Run command handler.
//!
//! Registers every configured process, starts the auto-start set (or the
//! `--only` selection), and streams output and lifecycle events until Ctrl-C
//! or until every process has settled.

use anyhow::{Result, bail};
use chrono::Utc;
use prochub_core::Definition;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::bootstrap::CliContext;
use crate::presentation::{format_event, format_live_line, format_status_line, format_stop_summary};

/// Pick the definitions to start.
pub fn select_targets<'a>(processes: &'a [Definition], only: &[String]) -> Result<Vec<&'a Definition>> {
    if only.is_empty() {
        return Ok(processes.iter().filter(|p| p.auto_start).collect());
    }

    let mut targets = Vec::with_capacity(only.len());
    for id in only {
        let Some(def) = processes.iter().find(|p| &p.id == id) else {
            bail!("No process with ID '{id}' in the config");
        };
        if !targets.iter().any(|t: &&Definition| t.id == def.id) {
            targets.push(def);
        }
    }
    Ok(targets)
}

/// Execute the run command.
pub async fn execute(ctx: &CliContext, only: &[String]) -> Result<()> {
    let targets = select_targets(&ctx.config.processes, only)?;
    if targets.is_empty() {
        println!("No processes to start.");
        println!("Mark one with autoStart in the config or pass --only <ID>.");
        return Ok(());
    }

    let (supervisor, router) = ctx.build_runtime();
    for def in &ctx.config.processes {
        router.ensure_process(&def.id);
        supervisor.register(def.clone()).await?;
    }

    let mut events = supervisor.subscribe();
    let mut lines = router.subscribe();

    for def in &targets {
        // A failed start is reported and does not affect the others
        if let Err(e) = supervisor.start(&def.id).await {
            eprintln!("Failed to start '{}': {e}", def.id);
        }
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        if supervisor.list().iter().all(|s| s.status.is_terminal()) {
            while let Ok(line) = lines.try_recv() {
                println!("{}", format_live_line(&line));
            }
            println!("All processes have exited.");
            break;
        }

        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                println!();
                let now = Utc::now();
                for snapshot in supervisor.list() {
                    println!("{}", format_status_line(&snapshot, now));
                }
                break;
            }
            line = lines.recv() => match line {
                Ok(line) => println!("{}", format_live_line(&line)),
                Err(RecvError::Lagged(skipped)) => eprintln!("... {skipped} log line(s) skipped"),
                Err(RecvError::Closed) => break,
            },
            event = events.recv() => match event {
                Ok(event) => println!("{}", format_event(&event)),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "Lifecycle events lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    println!("Stopping all processes...");
    let summary = supervisor.stop_all().await;
    for line in format_stop_summary(&summary) {
        println!("{line}");
    }

    for def in &ctx.config.processes {
        if let Some(error) = router.last_write_error(&def.id) {
            eprintln!(
                "Warning: {} log write(s) failed for '{}': {error}",
                router.write_failures(&def.id),
                def.id
            );
        }
    }

    if !summary.is_clean() {
        bail!("{} process(es) did not stop cleanly", summary.failed.len());
    }
    Ok(())
}
