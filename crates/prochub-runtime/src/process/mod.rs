//! Process supervision.
//!
//! # Structure
//!
//! - `Supervisor` - registry of definitions and the public lifecycle API
//! - `lifecycle` - spawn, exit watcher and restart timer tasks of a run
//! - `restart` - pure restart-policy decision
//! - `stream` - output pumps feeding the log sink
//! - `shutdown` - SIGTERM → SIGKILL termination
//! - `ProcessEventBroadcaster` - lifecycle event fan-out

mod broadcaster;
mod config;
mod lifecycle;
mod record;
pub mod restart;
pub mod shutdown;
mod stream;
mod supervisor;

pub use broadcaster::ProcessEventBroadcaster;
pub use config::SupervisorConfig;
pub use supervisor::{StartOutcome, StopAllSummary, Supervisor};
