//! Synchronized reminder priority queue
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use std::collections::BinaryHeap;
use std::sync::Mutex;

use super::entry::ReminderEntry;

/// Min-heap of pending reminders behind a single lock
///
/// Shared between the request path (insert, main runtime) and the engine
/// thread (pop, snapshot). The lock covers every read and write so a
/// snapshot never observes a half-applied mutation; callers get no access
/// to the heap itself.
pub struct ReminderQueue {
    heap: Mutex<BinaryHeap<ReminderEntry>>,
}

impl ReminderQueue {
    pub fn new() -> Self {
        ReminderQueue {
            heap: Mutex::new(BinaryHeap::new()),
        }
    }

    /// Build a queue from previously persisted entries
    pub fn from_entries(entries: Vec<ReminderEntry>) -> Self {
        ReminderQueue {
            heap: Mutex::new(entries.into_iter().collect()),
        }
    }

    /// Insert a new entry, O(log n)
    pub fn insert(&self, entry: ReminderEntry) {
        self.lock().push(entry);
    }

    /// Pop the earliest entry iff it is due at `now`
    ///
    /// The due check and the removal happen under one lock acquisition, so
    /// a concurrent insert of an even earlier entry cannot slip between
    /// them. Returns None when the queue is empty or the head is not due.
    pub fn pop_due(&self, now: f64) -> Option<ReminderEntry> {
        let mut heap = self.lock();
        if heap.peek().is_some_and(|head| head.is_due(now)) {
            heap.pop()
        } else {
            None
        }
    }

    /// Clone out the full pending set for persistence
    pub fn snapshot(&self) -> Vec<ReminderEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BinaryHeap<ReminderEntry>> {
        // A poisoned lock means a panic mid-push/pop on another thread;
        // the heap itself is still structurally valid.
        self.heap.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ReminderQueue {
    fn default() -> Self {
        Self::new()
    }
}
