//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - Path resolution and config loading (via prochub-core)
//! - Log router and supervisor (via prochub-runtime)
//!
//! Command handlers receive the composed context and delegate work to it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use prochub_core::{
    AppConfig, ConfigStore, DirectoryCreationStrategy, config_file_path, data_root,
    ensure_directory, log_root, validate_config,
};
use prochub_runtime::{LogRouter, LogRouterConfig, Supervisor, SupervisorConfig};

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory relative log paths are resolved against.
    pub data_root: PathBuf,
    /// Config file to load and save.
    pub config_path: PathBuf,
}

impl CliConfig {
    /// Resolve paths, honoring an explicit config file.
    ///
    /// With an explicit file, its directory acts as the data root.
    pub fn resolve(config_override: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_override {
            let data_root = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            return Ok(Self {
                data_root,
                config_path: path.to_path_buf(),
            });
        }

        Ok(Self {
            data_root: data_root()?,
            config_path: config_file_path()?,
        })
    }
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    /// Store the config was loaded from.
    pub store: ConfigStore,
    /// Loaded and validated configuration.
    pub config: AppConfig,
    /// Resolved data root.
    pub data_root: PathBuf,
    /// Resolved log root (`<log root>/<id>` per process).
    pub log_root: PathBuf,
}

impl CliContext {
    /// Persist a modified configuration.
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        validate_config(config)?;
        self.store.save(config)?;
        Ok(())
    }

    /// Log router configured from the loaded settings.
    pub fn log_router(&self) -> Arc<LogRouter> {
        Arc::new(LogRouter::new(LogRouterConfig {
            log_root: self.log_root.clone(),
            max_log_lines: self.config.max_log_lines,
            max_log_files: self.config.max_log_files,
            hub_capacity: self.config.stream_hub_capacity,
        }))
    }

    /// Build the supervisor with the router installed as its log sink.
    ///
    /// An unusable log root only costs durable history: capture into the
    /// stream hubs goes on and the router counts the failed writes.
    pub fn build_runtime(&self) -> (Supervisor, Arc<LogRouter>) {
        if let Err(e) = ensure_directory(&self.log_root, DirectoryCreationStrategy::AutoCreate) {
            tracing::warn!(
                log_root = %self.log_root.display(),
                error = %e,
                "Log directory is unusable, output will not be persisted"
            );
        }

        let router = self.log_router();
        let supervisor = Supervisor::with_log_sink(
            SupervisorConfig::from_app_config(&self.config),
            router.clone(),
        );
        (supervisor, router)
    }
}

/// Load the configuration and resolve paths.
pub fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let store = ConfigStore::new(&config.config_path);
    let app_config = store
        .load()
        .with_context(|| format!("Failed to load {}", config.config_path.display()))?;
    validate_config(&app_config)
        .with_context(|| format!("Invalid config {}", config.config_path.display()))?;

    let log_root = log_root(&config.data_root, &app_config.log_dir)?;
    tracing::debug!(
        config = %config.config_path.display(),
        log_root = %log_root.display(),
        processes = app_config.processes.len(),
        "Bootstrapped CLI context"
    );

    Ok(CliContext {
        store,
        config: app_config,
        data_root: config.data_root,
        log_root,
    })
}
