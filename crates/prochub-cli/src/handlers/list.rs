//! List command handler.
//!
//! Displays all configured process definitions in a formatted table.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::presentation::{print_separator, truncate_string};

/// Execute the list command.
pub fn execute(ctx: &CliContext, json: bool) -> Result<()> {
    let processes = &ctx.config.processes;

    if json {
        println!("{}", serde_json::to_string_pretty(processes)?);
        return Ok(());
    }

    if processes.is_empty() {
        println!("No processes configured.");
        println!("Use 'prochub add <name> <command>' to add your first process.");
        return Ok(());
    }

    println!("Found {} process(es):\n", processes.len());
    println!(
        "{:<12} {:<20} {:<11} {:<8} {:<5} Command",
        "ID", "Name", "Restart", "Max", "Auto"
    );
    print_separator(90);

    for def in processes {
        let command = std::iter::once(def.command.as_str())
            .chain(def.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "{:<12} {:<20} {:<11} {:<8} {:<5} {}",
            truncate_string(&def.id, 12),
            truncate_string(def.display_name(), 20),
            def.restart_policy.as_str(),
            def.max_restarts,
            if def.auto_start { "yes" } else { "no" },
            truncate_string(&command, 40)
        );
    }
    Ok(())
}
