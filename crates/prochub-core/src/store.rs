//! JSON persistence for [`AppConfig`].
//!
//! The store reads and writes one file. Hosts decide when to save.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::settings::AppConfig;

/// Errors from loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// File-backed configuration store.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration, returning defaults when the file does not exist.
    pub fn load(&self) -> Result<AppConfig, ConfigStoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Config file missing, using defaults");
                return Ok(AppConfig::default());
            }
            Err(source) => {
                return Err(ConfigStoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&content).map_err(|source| ConfigStoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Save the configuration atomically (write to a sibling temp file, then rename).
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigStoreError> {
        let json = serde_json::to_string_pretty(config)?;
        let write_err = |source| ConfigStoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp).map_err(write_err)?;
            file.write_all(json.as_bytes()).map_err(write_err)?;
            file.write_all(b"\n").map_err(write_err)?;
            file.sync_all().map_err(write_err)?;
        }
        fs::rename(&tmp, &self.path).map_err(write_err)?;

        debug!(path = %self.path.display(), processes = config.processes.len(), "Saved config");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Definition;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_defaults() {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path().join("config.json"));
        assert_eq!(store.load().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path().join("nested").join("config.json"));

        let mut config = AppConfig::default();
        config
            .add_process(Definition::new("web", "Web", "node").with_args(["app.js"]))
            .unwrap();
        store.save(&config).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, config);
        assert!(!tmp.path().join("nested").join("config.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ConfigStore::new(&path).load(),
            Err(ConfigStoreError::Parse { .. })
        ));
    }
}
