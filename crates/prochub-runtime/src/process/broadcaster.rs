//! Lifecycle event broadcasting.

use prochub_core::ProcessEvent;
use tokio::sync::broadcast;
use tracing::debug;

/// Broadcast channel capacity for lifecycle events
const CHANNEL_CAPACITY: usize = 64;

/// Broadcaster for process lifecycle events
#[derive(Debug)]
pub struct ProcessEventBroadcaster {
    sender: broadcast::Sender<ProcessEvent>,
}

impl ProcessEventBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Broadcast an event to all subscribers
    pub fn broadcast(&self, event: ProcessEvent) {
        // Skip the send (and the log line) when nobody listens
        if self.sender.receiver_count() > 0 {
            debug!(?event, "Broadcasting process event");
            let _ = self.sender.send(event);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProcessEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ProcessEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
