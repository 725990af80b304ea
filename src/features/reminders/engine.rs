//! Background reminder engine loop
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use log::{debug, error, info};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::bridge::DeliveryBridge;
use super::entry::unix_now;
use super::queue::ReminderQueue;
use super::store::ReminderStore;

/// Fixed poll interval of the engine thread
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// The polling loop that fires due reminders and snapshots the queue
///
/// Owns the queue together with the request path, and is the only writer
/// of the durable store. Runs on a dedicated OS thread for the process
/// lifetime; a single bad entry or failed snapshot never stops the loop.
pub struct ReminderEngine {
    queue: Arc<ReminderQueue>,
    store: ReminderStore,
    bridge: DeliveryBridge,
    save_ticks: u32,
}

impl ReminderEngine {
    pub fn new(
        queue: Arc<ReminderQueue>,
        store: ReminderStore,
        bridge: DeliveryBridge,
        save_ticks: u32,
    ) -> Self {
        ReminderEngine {
            queue,
            store,
            bridge,
            // A zero threshold would snapshot every tick; clamp to one.
            save_ticks: save_ticks.max(1),
        }
    }

    /// Start the engine on its own named thread
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("reminder-engine".to_string())
            .spawn(move || self.run())
    }

    fn run(self) {
        info!(
            "Reminder engine running, {} pending, snapshot every {} tick(s)",
            self.queue.len(),
            self.save_ticks
        );
        let mut ticks: u32 = 0;
        loop {
            thread::sleep(POLL_INTERVAL);
            let iteration = panic::catch_unwind(AssertUnwindSafe(|| self.tick(&mut ticks)));
            if iteration.is_err() {
                error!("Reminder engine iteration panicked; continuing on next tick");
            }
        }
    }

    /// One loop iteration: drain everything due, then maybe snapshot
    fn tick(&self, ticks: &mut u32) {
        self.drain(unix_now());

        *ticks += 1;
        if *ticks >= self.save_ticks {
            // The counter resets even on failure: a failed snapshot is
            // retried on the next full interval, not sooner.
            if let Err(e) = self.store.save(&self.queue.snapshot()) {
                error!("Failed to snapshot reminder queue: {e:#}");
            }
            *ticks = 0;
        }
    }

    /// Pop and hand off every entry due at `now`; returns the fired count
    fn drain(&self, now: f64) -> usize {
        let mut fired = 0;
        while let Some(entry) = self.queue.pop_due(now) {
            let due = chrono::DateTime::from_timestamp(entry.due_at as i64, 0)
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_else(|| format!("{}", entry.due_at));
            debug!("Firing reminder due {due} for {:?}", entry.target);
            if let Err(e) = self.bridge.submit(entry) {
                // Receiver gone means the runtime is shutting down; the
                // entry cannot be delivered and is dropped like any other
                // delivery failure.
                error!("{e:#}");
            }
            fired += 1;
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reminders::entry::{ReminderEntry, Target};
    use std::fs;
    use std::path::PathBuf;
    use uuid::Uuid;

    struct TempPath(PathBuf);

    impl TempPath {
        fn new() -> Self {
            TempPath(std::env::temp_dir().join(format!("engine-test-{}.bin", Uuid::new_v4())))
        }
    }

    impl Drop for TempPath {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.0);
            let _ = fs::remove_file(self.0.with_extension("bin.tmp"));
        }
    }

    fn engine_with(
        entries: Vec<ReminderEntry>,
        save_ticks: u32,
        path: &PathBuf,
    ) -> (ReminderEngine, tokio::sync::mpsc::UnboundedReceiver<ReminderEntry>) {
        let queue = Arc::new(ReminderQueue::from_entries(entries));
        let (bridge, rx) = DeliveryBridge::new();
        let engine = ReminderEngine::new(queue, ReminderStore::new(path), bridge, save_ticks);
        (engine, rx)
    }

    #[test]
    fn test_drain_fires_only_due_entries() {
        let tmp = TempPath::new();
        let now = 1000.0;
        let (engine, mut rx) = engine_with(
            vec![
                ReminderEntry::new(Target::User(1), now - 5.0, "due"),
                ReminderEntry::new(Target::User(2), now + 100.0, "not yet"),
            ],
            10,
            &tmp.0,
        );

        assert_eq!(engine.drain(now), 1);
        assert_eq!(rx.try_recv().unwrap().message, "due");
        assert!(rx.try_recv().is_err());
        assert_eq!(engine.queue.len(), 1);
    }

    #[test]
    fn test_drain_fires_each_entry_once() {
        let tmp = TempPath::new();
        let now = 1000.0;
        let (engine, mut rx) = engine_with(
            vec![
                ReminderEntry::new(Target::User(1), now - 3.0, "a"),
                ReminderEntry::new(Target::User(1), now - 2.0, "b"),
                ReminderEntry::new(Target::User(1), now - 1.0, "c"),
            ],
            10,
            &tmp.0,
        );

        assert_eq!(engine.drain(now), 3);
        assert_eq!(engine.drain(now), 0);

        let mut seen = Vec::new();
        while let Ok(entry) = rx.try_recv() {
            seen.push(entry.message);
        }
        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_drain_survives_dropped_receiver() {
        let tmp = TempPath::new();
        let now = 1000.0;
        let (engine, rx) = engine_with(
            vec![ReminderEntry::new(Target::User(1), now - 1.0, "orphan")],
            10,
            &tmp.0,
        );
        drop(rx);

        // Submission fails but drain completes and discards the entry
        assert_eq!(engine.drain(now), 1);
        assert!(engine.queue.is_empty());
    }

    #[test]
    fn test_tick_snapshots_at_threshold() {
        let tmp = TempPath::new();
        let (engine, _rx) = engine_with(
            vec![ReminderEntry::new(Target::Channel(9), f64::MAX, "keep")],
            3,
            &tmp.0,
        );

        let mut ticks = 0;
        engine.tick(&mut ticks);
        engine.tick(&mut ticks);
        assert!(!tmp.0.exists(), "no snapshot before the threshold");

        engine.tick(&mut ticks);
        assert_eq!(ticks, 0, "counter resets after snapshot");
        let persisted = ReminderStore::new(&tmp.0).load().unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].message, "keep");
    }

    #[test]
    fn test_zero_save_ticks_is_clamped() {
        let tmp = TempPath::new();
        let (engine, _rx) = engine_with(vec![], 0, &tmp.0);
        assert_eq!(engine.save_ticks, 1);
    }
}
