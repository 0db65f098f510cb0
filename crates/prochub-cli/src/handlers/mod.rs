//! Command handlers.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub fn execute(ctx: &CliContext, ...) -> Result<()>` (async for `run`)
//! - Thin wrappers that:
//!   1. Parse/validate CLI-specific input
//!   2. Call into the config store, router or supervisor
//!   3. Format output for the terminal

pub mod add;
pub mod list;
pub mod logs;
pub mod paths;
pub mod remove;
pub mod run;
pub mod update;
