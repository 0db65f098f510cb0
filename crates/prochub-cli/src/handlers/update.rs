//! Update command handler.
//!
//! Changes a process definition in the config. The ID never changes.

use std::time::Duration;

use anyhow::{Result, anyhow};
use prochub_core::Definition;

use crate::bootstrap::CliContext;
use crate::commands::UpdateArgs;

/// Apply the requested changes to an existing definition.
pub fn apply_update(mut def: Definition, args: UpdateArgs) -> Definition {
    if let Some(name) = args.name {
        def.name = name;
    }
    if let Some(command) = args.command {
        def.command = command;
    }
    if args.clear_args {
        def.args.clear();
    } else if !args.args.is_empty() {
        def.args = args.args;
    }
    if let Some(policy) = args.restart_policy {
        def.restart_policy = policy;
    }
    if let Some(max) = args.max_restarts {
        def.max_restarts = max;
    }
    if let Some(ms) = args.restart_delay_ms {
        def.restart_delay = Duration::from_millis(ms);
    }
    if args.clear_cwd {
        def.working_dir = None;
    } else if let Some(dir) = args.cwd {
        def.working_dir = Some(dir);
    }
    for key in &args.unset_env {
        def.env.remove(key);
    }
    def.env.extend(args.env);
    if let Some(auto_start) = args.auto_start {
        def.auto_start = auto_start;
    }
    def
}

/// Execute the update command.
pub fn execute(ctx: &CliContext, args: UpdateArgs) -> Result<()> {
    let id = args.id.clone();
    let existing = ctx
        .config
        .find_process(&id)
        .cloned()
        .ok_or_else(|| anyhow!("No process with ID '{id}' in the config"))?;

    let updated = apply_update(existing, args);
    let mut config = ctx.config.clone();
    config.update_process(&id, updated)?;
    ctx.save(&config)?;

    tracing::debug!(process_id = %id, "Updated process definition");
    println!("Updated process '{id}' in {}", ctx.store.path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use prochub_core::RestartPolicy;

    fn args(id: &str) -> UpdateArgs {
        UpdateArgs {
            id: id.to_string(),
            name: None,
            command: None,
            args: Vec::new(),
            clear_args: false,
            restart_policy: None,
            max_restarts: None,
            restart_delay_ms: None,
            cwd: None,
            clear_cwd: false,
            env: Vec::new(),
            unset_env: Vec::new(),
            auto_start: None,
        }
    }

    fn web() -> Definition {
        Definition::new("web", "Web", "node")
            .with_args(["server.js"])
            .with_working_dir("/srv/web")
            .with_env("PORT", "8080")
            .with_env("DEBUG", "1")
    }

    #[test]
    fn test_no_flags_changes_nothing() {
        assert_eq!(apply_update(web(), args("web")), web());
    }

    #[test]
    fn test_flags_replace_fields() {
        let mut update = args("web");
        update.command = Some("bun".into());
        update.args = vec!["run".into(), "app.ts".into()];
        update.restart_policy = Some(RestartPolicy::Always);
        update.restart_delay_ms = Some(250);
        update.clear_cwd = true;
        update.unset_env = vec!["DEBUG".into()];
        update.env = vec![("PORT".into(), "9090".into())];
        update.auto_start = Some(true);

        let def = apply_update(web(), update);
        assert_eq!(def.id, "web");
        assert_eq!(def.name, "Web");
        assert_eq!(def.command, "bun");
        assert_eq!(def.args, ["run", "app.ts"]);
        assert_eq!(def.restart_policy, RestartPolicy::Always);
        assert_eq!(def.restart_delay, Duration::from_millis(250));
        assert!(def.working_dir.is_none());
        assert_eq!(def.env.len(), 1);
        assert_eq!(def.env.get("PORT").map(String::as_str), Some("9090"));
        assert!(def.auto_start);
    }
}
