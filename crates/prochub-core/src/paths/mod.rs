//! Path utilities for prochub data directories.
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - No interactive/terminal I/O - adapters handle user prompts separately
//! - Environment lookups are isolated behind pure resolvers for testing

mod ensure;
mod error;
mod platform;

// Error type
pub use error::PathError;

// Roots and per-process locations
pub use platform::{
    DATA_DIR_ENV, config_file_path, data_root, log_root, process_log_dir, resolve_data_root,
};

// Directory operations
pub use ensure::{DirectoryCreationStrategy, ensure_directory, verify_writable};
