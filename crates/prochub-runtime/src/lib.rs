//! Process runtime for prochub.
//!
//! Spawns and supervises local OS processes, captures their output through
//! the [`LogSinkPort`](prochub_core::LogSinkPort), and stores it in memory
//! ([`StreamHub`]) and on disk ([`RollingLogStore`]).
#![deny(unsafe_code)]

pub mod logging;
pub mod process;

// Re-export the supervisor API
pub use process::{
    ProcessEventBroadcaster, StartOutcome, StopAllSummary, Supervisor, SupervisorConfig,
};

// Re-export log storage
pub use logging::{LiveLogLine, LogRouter, LogRouterConfig, RollingLogStore, StreamHub};
