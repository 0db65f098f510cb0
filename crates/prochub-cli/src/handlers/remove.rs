//! Remove command handler.
//!
//! Removes a process definition from the config. Its log files remain on disk.

use anyhow::Result;

use crate::bootstrap::CliContext;

/// Execute the remove command.
pub fn execute(ctx: &CliContext, id: &str) -> Result<()> {
    let mut config = ctx.config.clone();
    let Ok(removed) = config.remove_process(id) else {
        println!("No process found with ID '{id}'.");
        println!("Use 'prochub list' to see configured processes.");
        return Ok(());
    };
    ctx.save(&config)?;

    println!("Removed process '{}' ({})", removed.id, removed.display_name());
    Ok(())
}
