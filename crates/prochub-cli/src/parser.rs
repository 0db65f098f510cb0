//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the local process supervisor.
///
/// This is the top-level parser that handles global options and dispatches
/// to subcommands.
#[derive(Parser)]
#[command(name = "prochub")]
#[command(about = "Supervise local processes and keep their logs")]
#[command(version)]
pub struct Cli {
    /// Use this config file instead of the one in the data directory
    #[arg(long = "config", global = true, env = "PROCHUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use prochub_core::RestartPolicy;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from(["prochub", "list", "--verbose", "--config", "/tmp/p.json"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.json")));
        assert!(matches!(cli.command, Some(Commands::List { json: false })));
    }

    #[test]
    fn test_add_args() {
        let cli = Cli::parse_from([
            "prochub",
            "add",
            "web",
            "node",
            "--restart-policy",
            "always",
            "--env",
            "PORT=3000",
            "--auto-start",
            "--",
            "server.js",
            "--port",
            "3000",
        ]);
        let Some(Commands::Add(args)) = cli.command else {
            panic!("expected add command");
        };
        assert_eq!(args.name, "web");
        assert_eq!(args.command, "node");
        assert_eq!(args.args, ["server.js", "--port", "3000"]);
        assert_eq!(args.restart_policy, Some(RestartPolicy::Always));
        assert_eq!(args.env, [("PORT".to_string(), "3000".to_string())]);
        assert!(args.auto_start);
    }

    #[test]
    fn test_update_args() {
        let cli = Cli::parse_from([
            "prochub",
            "update",
            "web",
            "--max-restarts",
            "7",
            "--auto-start",
            "false",
            "--unset-env",
            "DEBUG",
            "--",
            "app.js",
        ]);
        let Some(Commands::Update(args)) = cli.command else {
            panic!("expected update command");
        };
        assert_eq!(args.id, "web");
        assert_eq!(args.max_restarts, Some(7));
        assert_eq!(args.auto_start, Some(false));
        assert_eq!(args.unset_env, ["DEBUG"]);
        assert_eq!(args.args, ["app.js"]);
        assert!(args.name.is_none());
        assert!(args.restart_delay_ms.is_none());

        let conflicting = Cli::try_parse_from(["prochub", "update", "web", "--clear-args", "--", "x"]);
        assert!(conflicting.is_err());
    }

    #[test]
    fn test_bad_env_pair_is_rejected() {
        let result = Cli::try_parse_from(["prochub", "add", "web", "node", "--env", "NOPE"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_logs_args() {
        let cli = Cli::parse_from(["prochub", "logs", "web", "--tail", "20"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Logs { ref id, tail: Some(20), output: None }) if id == "web"
        ));
    }
}
