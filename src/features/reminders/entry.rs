//! Reminder queue entry types
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::{SystemTime, UNIX_EPOCH};

/// Delivery destination for a reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// Direct message to a user
    User(u64),
    /// Message in a channel
    Channel(u64),
}

/// One scheduled reminder: who, when, what
///
/// Immutable after creation. Ordering is by `due_at` only, reversed so a
/// `std::collections::BinaryHeap` yields the earliest entry first; entries
/// with equal timestamps compare equal and pop in arbitrary order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderEntry {
    pub target: Target,
    /// Absolute unix timestamp (seconds) at which to fire
    pub due_at: f64,
    /// Reminder text, delivered verbatim
    pub message: String,
}

impl ReminderEntry {
    pub fn new(target: Target, due_at: f64, message: impl Into<String>) -> Self {
        ReminderEntry {
            target,
            due_at,
            message: message.into(),
        }
    }

    /// Whether this entry should fire at time `now`
    pub fn is_due(&self, now: f64) -> bool {
        self.due_at < now
    }
}

impl PartialEq for ReminderEntry {
    fn eq(&self, other: &Self) -> bool {
        self.due_at.total_cmp(&other.due_at) == Ordering::Equal
    }
}

impl Eq for ReminderEntry {}

impl Ord for ReminderEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other.due_at.total_cmp(&self.due_at)
    }
}

impl PartialOrd for ReminderEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Current unix time in floating seconds
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
