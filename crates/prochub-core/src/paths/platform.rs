//! Data root and per-process log directory resolution.

use std::env;
use std::path::{Path, PathBuf};

use super::error::PathError;

/// Environment variable that overrides the data root.
pub const DATA_DIR_ENV: &str = "PROCHUB_DATA_DIR";

/// Name of the data directory under the user's home.
const DATA_DIR_NAME: &str = ".prochub";

/// File name of the persisted configuration.
const CONFIG_FILE_NAME: &str = "config.json";

/// Get the root directory for application data (config, logs).
///
/// Resolution order:
/// 1. `PROCHUB_DATA_DIR` environment variable
/// 2. `~/.prochub`
pub fn data_root() -> Result<PathBuf, PathError> {
    resolve_data_root(env::var(DATA_DIR_ENV).ok().as_deref(), dirs::home_dir())
}

/// Pure form of [`data_root`] for testing.
pub fn resolve_data_root(
    env_override: Option<&str>,
    home: Option<PathBuf>,
) -> Result<PathBuf, PathError> {
    if let Some(raw) = env_override.map(str::trim).filter(|s| !s.is_empty()) {
        return Ok(PathBuf::from(raw));
    }
    home.map(|h| h.join(DATA_DIR_NAME))
        .ok_or(PathError::NoHomeDir)
}

/// Location of the persisted configuration file.
pub fn config_file_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(CONFIG_FILE_NAME))
}

/// Resolve the configured log directory against the data root.
///
/// Absolute directories are used as-is.
pub fn log_root(data_root: &Path, log_dir: &str) -> Result<PathBuf, PathError> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err(PathError::EmptyPath);
    }
    let dir = Path::new(trimmed);
    if dir.is_absolute() {
        Ok(dir.to_path_buf())
    } else {
        Ok(data_root.join(dir))
    }
}

/// Directory holding the durable logs of one process.
pub fn process_log_dir(log_root: &Path, process_id: &str) -> PathBuf {
    log_root.join(process_id)
}
