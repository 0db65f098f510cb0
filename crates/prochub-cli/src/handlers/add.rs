//! Add command handler.
//!
//! Appends a process definition to the config file.

use std::time::Duration;

use anyhow::Result;
use prochub_core::Definition;

use crate::bootstrap::CliContext;
use crate::commands::AddArgs;

/// Build the definition described by the arguments, applying config defaults.
pub fn build_definition(ctx: &CliContext, args: AddArgs) -> Definition {
    let mut def = ctx
        .config
        .new_definition(args.name, args.command)
        .with_args(args.args)
        .with_auto_start(args.auto_start)
        .with_restart_delay(Duration::from_millis(args.restart_delay_ms));

    if let Some(id) = args.id {
        def.id = id;
    }
    if let Some(policy) = args.restart_policy {
        def = def.with_restart_policy(policy);
    }
    if let Some(max) = args.max_restarts {
        def = def.with_max_restarts(max);
    }
    if let Some(dir) = args.cwd {
        def = def.with_working_dir(dir);
    }
    for (key, value) in args.env {
        def = def.with_env(key, value);
    }
    def
}

/// Execute the add command.
pub fn execute(ctx: &CliContext, args: AddArgs) -> Result<()> {
    let def = build_definition(ctx, args);
    let mut config = ctx.config.clone();
    let id = config.add_process(def)?;
    ctx.save(&config)?;

    println!("Added process '{id}' to {}", ctx.store.path().display());
    Ok(())
}
