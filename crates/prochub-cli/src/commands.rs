//! Main commands enum and primary subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use prochub_core::RestartPolicy;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Start the configured processes and stream their output until Ctrl-C
    Run {
        /// Start only these process IDs instead of the auto-start set
        #[arg(long = "only", value_name = "ID")]
        only: Vec<String>,
    },

    /// List configured processes
    List {
        /// Print the definitions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a process definition to the config
    Add(AddArgs),

    /// Change a process definition in the config, keeping its ID
    Update(UpdateArgs),

    /// Remove a process definition from the config
    Remove {
        /// ID of the process to remove
        id: String,
    },

    /// Show the stored log history of a process
    Logs {
        /// ID of the process
        id: String,
        /// Only show the last N lines
        #[arg(short = 'n', long)]
        tail: Option<usize>,
        /// Write the history to this file instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show resolved paths for the data directory, config and logs
    Paths,
}

/// Arguments of the `add` command.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Display name
    pub name: String,

    /// Executable to run
    pub command: String,

    /// Arguments passed to the executable (put them after `--`)
    #[arg(last = true)]
    pub args: Vec<String>,

    /// Explicit ID (generated as proc-N when omitted)
    #[arg(long)]
    pub id: Option<String>,

    /// Restart policy: never, on_failure or always
    #[arg(long = "restart-policy")]
    pub restart_policy: Option<RestartPolicy>,

    /// Maximum automatic restarts
    #[arg(long = "max-restarts")]
    pub max_restarts: Option<u32>,

    /// Delay before an automatic restart, in milliseconds
    #[arg(long = "restart-delay-ms", default_value_t = 0)]
    pub restart_delay_ms: u64,

    /// Working directory
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Extra environment variable (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Start this process automatically with `prochub run`
    #[arg(long = "auto-start")]
    pub auto_start: bool,
}

/// Arguments of the `update` command. Omitted flags leave the field unchanged.
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// ID of the process to update
    pub id: String,

    /// New display name
    #[arg(long)]
    pub name: Option<String>,

    /// New executable
    #[arg(long)]
    pub command: Option<String>,

    /// Replacement arguments (put them after `--`)
    #[arg(last = true)]
    pub args: Vec<String>,

    /// Drop all arguments
    #[arg(long = "clear-args", conflicts_with = "args")]
    pub clear_args: bool,

    /// Restart policy: never, on_failure or always
    #[arg(long = "restart-policy")]
    pub restart_policy: Option<RestartPolicy>,

    /// Maximum automatic restarts
    #[arg(long = "max-restarts")]
    pub max_restarts: Option<u32>,

    /// Delay before an automatic restart, in milliseconds
    #[arg(long = "restart-delay-ms")]
    pub restart_delay_ms: Option<u64>,

    /// Working directory
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Run in the supervisor's working directory again
    #[arg(long = "clear-cwd", conflicts_with = "cwd")]
    pub clear_cwd: bool,

    /// Set an environment variable (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Remove an environment variable (repeatable)
    #[arg(long = "unset-env", value_name = "KEY")]
    pub unset_env: Vec<String>,

    /// Whether `prochub run` starts this process automatically
    #[arg(long = "auto-start", value_name = "BOOL")]
    pub auto_start: Option<bool>,
}

fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty variable name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
