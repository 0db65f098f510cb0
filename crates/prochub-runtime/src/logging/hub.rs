//! Bounded in-memory buffer of recent log entries for one process.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use prochub_core::LogEntry;

/// Ring buffer storing the most recent log entries of a process.
///
/// Pushing never blocks on I/O and never fails. Once the buffer holds
/// `capacity` entries, every push evicts the oldest one. A hub with
/// capacity 0 retains nothing.
#[derive(Debug)]
pub struct StreamHub {
    capacity: usize,
    entries: Mutex<VecDeque<LogEntry>>,
}

impl StreamHub {
    /// Create an empty hub holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Append an entry, evicting the oldest if at capacity.
    pub fn push(&self, entry: LogEntry) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.lock();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Chronological copy of the retained entries.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    // A panic while holding the lock cannot leave the deque half-updated.
    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prochub_core::LogStream;
    use std::sync::Arc;

    fn entry(n: usize) -> LogEntry {
        LogEntry::now(LogStream::Stdout, format!("line {n}"))
    }

    #[test]
    fn test_keeps_last_capacity_entries_in_order() {
        let hub = StreamHub::new(3);
        for n in 0..5 {
            hub.push(entry(n));
        }

        let lines: Vec<String> = hub.snapshot().into_iter().map(|e| e.line).collect();
        assert_eq!(lines, ["line 2", "line 3", "line 4"]);
        assert_eq!(hub.len(), 3);
    }

    #[test]
    fn test_zero_capacity_retains_nothing() {
        let hub = StreamHub::new(0);
        hub.push(entry(1));
        assert!(hub.is_empty());
        assert!(hub.snapshot().is_empty());
    }

    #[test]
    fn test_clear() {
        let hub = StreamHub::new(10);
        hub.push(entry(1));
        hub.push(entry(2));
        hub.clear();
        assert!(hub.is_empty());
        assert_eq!(hub.capacity(), 10);
    }

    #[test]
    fn test_concurrent_pushes_stay_bounded() {
        let hub = Arc::new(StreamHub::new(50));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let hub = Arc::clone(&hub);
                std::thread::spawn(move || {
                    for n in 0..100 {
                        hub.push(entry(t * 1000 + n));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(hub.len(), 50);
    }
}
