//! Paths command handler.
//!
//! Displays all resolved paths for diagnostics.

use anyhow::Result;

use crate::bootstrap::CliContext;

/// Execute the paths command, printing `key = value` lines.
pub fn execute(ctx: &CliContext) -> Result<()> {
    println!("data_root = {}", ctx.data_root.display());
    println!("config_file = {}", ctx.store.path().display());
    println!("log_root = {}", ctx.log_root.display());
    Ok(())
}
