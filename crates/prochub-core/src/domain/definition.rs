//! Process definitions authored by the user.
//!
//! A [`Definition`] is the immutable description of a managed process. The
//! supervisor takes ownership of a copy on registration; changing a process
//! means registering a new `Definition` under the same ID.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default restart budget applied when a definition does not specify one.
pub const DEFAULT_MAX_RESTARTS: u32 = 5;

/// Rule governing whether a process is relaunched after it exits on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartPolicy {
    /// Never relaunch.
    Never,
    /// Relaunch only after a nonzero exit (or death by signal).
    #[default]
    OnFailure,
    /// Relaunch after every exit, subject to `max_restarts`.
    Always,
}

impl RestartPolicy {
    /// Stable string form used in config files and CLI flags.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::OnFailure => "on_failure",
            Self::Always => "always",
        }
    }
}

impl fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RestartPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "never" | "no" => Ok(Self::Never),
            "on_failure" | "onfailure" => Ok(Self::OnFailure),
            "always" => Ok(Self::Always),
            other => Err(format!(
                "unknown restart policy '{other}' (expected never, on_failure or always)"
            )),
        }
    }
}

/// User-authored description of a managed process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    /// Unique, stable identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Executable to launch (resolved through `PATH` when not absolute).
    pub command: String,
    /// Arguments passed to the command, in order.
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory; the supervisor's own directory is inherited when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
    /// Extra environment variables layered over the inherited environment.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Whether the host should start this process on launch.
    #[serde(default)]
    pub auto_start: bool,
    /// What to do when the process exits on its own.
    #[serde(default)]
    pub restart_policy: RestartPolicy,
    /// Maximum consecutive automatic restarts before landing in `Crashed`.
    #[serde(default = "default_max_restarts")]
    pub max_restarts: u32,
    /// Delay before an automatic restart.
    #[serde(default, rename = "restartDelayMs", with = "duration_ms")]
    pub restart_delay: Duration,
}

const fn default_max_restarts() -> u32 {
    DEFAULT_MAX_RESTARTS
}

impl Definition {
    /// Create a definition with required fields and default policy.
    pub fn new(id: impl Into<String>, name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            working_dir: None,
            env: BTreeMap::new(),
            auto_start: false,
            restart_policy: RestartPolicy::default(),
            max_restarts: DEFAULT_MAX_RESTARTS,
            restart_delay: Duration::ZERO,
        }
    }

    /// Set the argument list.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Add one environment variable (later values for the same key win).
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Mark the definition for automatic start.
    #[must_use]
    pub const fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// Set the restart policy.
    #[must_use]
    pub const fn with_restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.restart_policy = policy;
        self
    }

    /// Set the restart budget.
    #[must_use]
    pub const fn with_max_restarts(mut self, max_restarts: u32) -> Self {
        self.max_restarts = max_restarts;
        self
    }

    /// Set the backoff before an automatic restart.
    #[must_use]
    pub const fn with_restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay = delay;
        self
    }

    /// Name to show in UIs, falling back to the ID.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Check the fields the supervisor relies on.
    ///
    /// Returns a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        validate_process_id(&self.id)?;
        if self.command.trim().is_empty() {
            return Err(format!("process '{}' has an empty command", self.id));
        }
        if let Some(key) = self.env.keys().find(|k| k.is_empty() || k.contains('=')) {
            return Err(format!(
                "process '{}' has an invalid environment key '{key}'",
                self.id
            ));
        }
        Ok(())
    }
}

/// Check that `id` is usable as a process ID.
///
/// IDs name the per-process log directory, so they must be a single path
/// component.
pub fn validate_process_id(id: &str) -> Result<(), String> {
    if id.trim().is_empty() {
        return Err("process id cannot be empty".to_string());
    }
    if id.contains(['/', '\\']) || id == "." || id == ".." {
        return Err(format!("process id '{id}' must not contain path separators"));
    }
    Ok(())
}

/// Serialize a `Duration` as whole milliseconds.
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
