//! Log capture storage: in-memory stream hubs, rolling segment files, and
//! the router that feeds both from the supervisor's sink.

mod hub;
mod rolling;
pub mod rotation;
mod router;

pub use hub::StreamHub;
pub use rolling::RollingLogStore;
pub use router::{LiveLogLine, LogRouter, LogRouterConfig};
