//! Core domain types and port definitions for prochub.
//!
//! This crate holds everything a host needs to describe and observe managed
//! processes without pulling in an async runtime: process definitions,
//! status snapshots, log entries, lifecycle events, the log sink port, the
//! error taxonomy, settings and path resolution.
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod events;
pub mod logs;
pub mod paths;
pub mod ports;
pub mod settings;
pub mod store;

// Re-export commonly used types for convenience
pub use domain::{
    DEFAULT_MAX_RESTARTS, Definition, ProcessSnapshot, ProcessStatus, RestartPolicy,
    validate_process_id,
};
pub use error::{LogStoreError, SupervisorError};
pub use events::{ProcessEvent, ProcessStateInfo};
pub use logs::{LogEntry, LogStream};
pub use ports::{LogSinkPort, NoopLogSink};
pub use settings::{AppConfig, SettingsError, validate_config};
pub use store::{ConfigStore, ConfigStoreError};

// Re-export path utilities
pub use paths::{
    DirectoryCreationStrategy, PathError, config_file_path, data_root, ensure_directory, log_root,
    process_log_dir,
};
