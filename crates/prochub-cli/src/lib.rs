//! Command-line host for prochub.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary only
use tracing_subscriber as _;

#[cfg(test)]
use tempfile as _;

pub mod bootstrap;
pub mod commands;
pub mod handlers;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::{AddArgs, Commands, UpdateArgs};
pub use parser::Cli;
