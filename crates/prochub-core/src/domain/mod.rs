//! Domain types for supervised processes.

mod definition;
mod status;

pub use definition::{DEFAULT_MAX_RESTARTS, Definition, RestartPolicy, validate_process_id};
pub use status::{ProcessSnapshot, ProcessStatus};
