//! Application settings and validation.
//!
//! This module contains the persisted configuration consumed by hosts at
//! startup: log retention, supervisor timings and the list of process
//! definitions. These are pure domain types with no infrastructure dependencies.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{DEFAULT_MAX_RESTARTS, Definition, RestartPolicy};

/// Default log directory, relative to the data root.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Default number of lines per log segment.
pub const DEFAULT_MAX_LOG_LINES: usize = 1000;

/// Default number of sealed log segments kept per process.
pub const DEFAULT_MAX_LOG_FILES: usize = 5;

/// Default number of recent entries kept in memory per process.
pub const DEFAULT_STREAM_HUB_CAPACITY: usize = 100;

/// Default grace period between SIGTERM and SIGKILL.
pub const DEFAULT_STOP_GRACE_PERIOD_MS: u64 = 5_000;

/// Default upper bound for stopping everything at shutdown.
pub const DEFAULT_STOP_ALL_TIMEOUT_MS: u64 = 10_000;

/// Default continuous uptime after which the restart counter resets.
pub const DEFAULT_STABILITY_WINDOW_SECS: u64 = 60;

/// Application configuration structure.
///
/// Missing fields fall back to defaults so that older config files keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Log directory; relative paths are resolved against the data root.
    pub log_dir: String,

    /// Lines per log segment before rotation.
    pub max_log_lines: usize,

    /// Sealed log segments kept per process.
    pub max_log_files: usize,

    /// Restart budget applied to newly added processes.
    pub max_restart: u32,

    /// Restart policy applied to newly added processes.
    pub restart_policy: RestartPolicy,

    /// Recent log entries kept in memory per process.
    pub stream_hub_capacity: usize,

    /// Grace period before a stop escalates to a forced kill.
    pub stop_grace_period_ms: u64,

    /// Upper bound for stopping every process at shutdown.
    pub stop_all_timeout_ms: u64,

    /// Continuous uptime after which the restart counter resets.
    pub stability_window_secs: u64,

    /// Managed process definitions, in display order.
    pub processes: Vec<Definition>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_dir: DEFAULT_LOG_DIR.to_string(),
            max_log_lines: DEFAULT_MAX_LOG_LINES,
            max_log_files: DEFAULT_MAX_LOG_FILES,
            max_restart: DEFAULT_MAX_RESTARTS,
            restart_policy: RestartPolicy::OnFailure,
            stream_hub_capacity: DEFAULT_STREAM_HUB_CAPACITY,
            stop_grace_period_ms: DEFAULT_STOP_GRACE_PERIOD_MS,
            stop_all_timeout_ms: DEFAULT_STOP_ALL_TIMEOUT_MS,
            stability_window_secs: DEFAULT_STABILITY_WINDOW_SECS,
            processes: Vec::new(),
        }
    }
}

impl AppConfig {
    #[must_use]
    pub const fn stop_grace_period(&self) -> Duration {
        Duration::from_millis(self.stop_grace_period_ms)
    }

    #[must_use]
    pub const fn stop_all_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_all_timeout_ms)
    }

    #[must_use]
    pub const fn stability_window(&self) -> Duration {
        Duration::from_secs(self.stability_window_secs)
    }

    /// Look up a definition by ID.
    pub fn find_process(&self, id: &str) -> Option<&Definition> {
        self.processes.iter().find(|p| p.id == id)
    }

    /// Start a new definition carrying the configured restart defaults.
    pub fn new_definition(&self, name: impl Into<String>, command: impl Into<String>) -> Definition {
        Definition::new(String::new(), name, command)
            .with_restart_policy(self.restart_policy)
            .with_max_restarts(self.max_restart)
    }

    /// Add a new definition, generating an ID when none is given.
    ///
    /// Generated IDs follow the `proc-N` pattern and never collide with an
    /// existing entry. Returns the ID the definition was stored under.
    pub fn add_process(&mut self, mut def: Definition) -> Result<String, SettingsError> {
        if def.id.trim().is_empty() {
            def.id = self.next_process_id();
        }
        if self.find_process(&def.id).is_some() {
            return Err(SettingsError::DuplicateProcessId(def.id));
        }
        def.validate().map_err(SettingsError::InvalidProcess)?;

        let id = def.id.clone();
        self.processes.push(def);
        Ok(id)
    }

    /// Replace the definition stored under `id`, keeping the ID stable.
    pub fn update_process(&mut self, id: &str, mut def: Definition) -> Result<(), SettingsError> {
        def.id = id.to_string();
        def.validate().map_err(SettingsError::InvalidProcess)?;

        let slot = self
            .processes
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| SettingsError::ProcessNotFound(id.to_string()))?;
        *slot = def;
        Ok(())
    }

    /// Remove the definition stored under `id`.
    pub fn remove_process(&mut self, id: &str) -> Result<Definition, SettingsError> {
        let index = self
            .processes
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| SettingsError::ProcessNotFound(id.to_string()))?;
        Ok(self.processes.remove(index))
    }

    fn next_process_id(&self) -> String {
        let mut n = self.processes.len() + 1;
        loop {
            let candidate = format!("proc-{n}");
            if self.find_process(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Log directory cannot be empty")]
    EmptyLogDir,

    #[error("Max log lines must be at least 1, got {0}")]
    InvalidMaxLogLines(usize),

    #[error("Max log files must be at least 1, got {0}")]
    InvalidMaxLogFiles(usize),

    #[error("Stop-all timeout must be greater than zero")]
    InvalidStopAllTimeout,

    #[error("Duplicate process id: {0}")]
    DuplicateProcessId(String),

    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Invalid process definition: {0}")]
    InvalidProcess(String),
}

/// Validate a configuration before handing it to the runtime.
pub fn validate_config(config: &AppConfig) -> Result<(), SettingsError> {
    if config.log_dir.trim().is_empty() {
        return Err(SettingsError::EmptyLogDir);
    }
    if config.max_log_lines == 0 {
        return Err(SettingsError::InvalidMaxLogLines(config.max_log_lines));
    }
    if config.max_log_files == 0 {
        return Err(SettingsError::InvalidMaxLogFiles(config.max_log_files));
    }
    if config.stop_all_timeout_ms == 0 {
        return Err(SettingsError::InvalidStopAllTimeout);
    }

    let mut seen = HashSet::new();
    for def in &config.processes {
        def.validate().map_err(SettingsError::InvalidProcess)?;
        if !seen.insert(def.id.as_str()) {
            return Err(SettingsError::DuplicateProcessId(def.id.clone()));
        }
    }

    Ok(())
}
