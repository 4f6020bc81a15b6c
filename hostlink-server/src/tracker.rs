//! Tracking of open connections.
//!
//! The tracker is the only cross-connection shared mutable state: a mutex
//! guarded id set, locked only for add/remove/count — never across I/O or
//! across the host rendezvous.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct ConnectionTracker {
    inner: Arc<TrackerInner>,
}

#[derive(Default)]
struct TrackerInner {
    next_id: AtomicU64,
    open: Mutex<HashSet<u64>>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a newly accepted connection, returning its id.
    pub fn register(&self) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.open.lock().insert(id);
        id
    }

    /// Removes a connection; returns whether it was still tracked.
    pub fn deregister(&self, id: u64) -> bool {
        self.inner.open.lock().remove(&id)
    }

    /// Number of currently open connections.
    pub fn active(&self) -> usize {
        self.inner.open.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.open.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_deregister() {
        let tracker = ConnectionTracker::new();
        let a = tracker.register();
        let b = tracker.register();
        assert_ne!(a, b);
        assert_eq!(tracker.active(), 2);

        assert!(tracker.deregister(a));
        assert!(!tracker.deregister(a));
        assert_eq!(tracker.active(), 1);

        assert!(tracker.deregister(b));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let tracker = ConnectionTracker::new();
        let other = tracker.clone();
        let id = tracker.register();
        assert_eq!(other.active(), 1);
        other.deregister(id);
        assert!(tracker.is_empty());
    }
}
