//! Logs command handler.
//!
//! Reads the durable history of a process from its rolling log store.

use std::path::Path;

use anyhow::{Result, anyhow};
use prochub_core::validate_process_id;

use crate::bootstrap::CliContext;

/// Execute the logs command.
pub fn execute(ctx: &CliContext, id: &str, tail: Option<usize>, output: Option<&Path>) -> Result<()> {
    validate_process_id(id).map_err(|reason| anyhow!(reason))?;
    let router = ctx.log_router();

    if let Some(dest) = output {
        let count = router.export(id, dest)?;
        println!("Exported {count} line(s) to {}", dest.display());
        return Ok(());
    }

    let lines = router.read_history(id)?;
    if lines.is_empty() {
        println!("No logs stored for '{id}' in {}", router.process_dir(id).display());
        return Ok(());
    }

    let skip = tail.map_or(0, |n| lines.len().saturating_sub(n));
    for line in &lines[skip..] {
        println!("{line}");
    }
    Ok(())
}
