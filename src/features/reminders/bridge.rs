//! Delivery handoff from the engine thread to the gateway runtime
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use anyhow::{Context as AnyhowContext, Result};
use log::{info, warn};
use serenity::http::Http;
use serenity::model::id::{ChannelId, UserId};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::entry::{ReminderEntry, Target};

/// Sender half of the delivery channel, held by the engine thread
///
/// The engine runs on a plain OS thread and must not perform network I/O
/// itself; it hands each due entry to the async runtime through an
/// unbounded channel. `submit` confirms the entry is queued for delivery,
/// not that delivery completed.
pub struct DeliveryBridge {
    tx: UnboundedSender<ReminderEntry>,
}

impl DeliveryBridge {
    /// Create the bridge and the receiver for [`delivery_loop`]
    pub fn new() -> (Self, UnboundedReceiver<ReminderEntry>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (DeliveryBridge { tx }, rx)
    }

    /// Queue an entry for delivery on the gateway runtime
    ///
    /// Fails only when the runtime side has shut down and the receiver is
    /// gone; the entry is returned to the caller inside the error context
    /// for logging.
    pub fn submit(&self, entry: ReminderEntry) -> Result<()> {
        self.tx
            .send(entry)
            .map_err(|e| anyhow::anyhow!("delivery task is gone, dropping reminder: {}", e.0.message))
    }
}

/// Receive fired reminders and deliver them through Discord
///
/// Runs as a task on the main runtime for the process lifetime. Each
/// failed resolution or send is logged and the entry dropped; there is no
/// retry and no re-enqueue.
pub async fn delivery_loop(mut rx: UnboundedReceiver<ReminderEntry>, http: Arc<Http>) {
    while let Some(entry) = rx.recv().await {
        if let Err(e) = deliver(&http, &entry).await {
            warn!(
                "Dropping reminder for {:?} (message was '{}'): {e:#}",
                entry.target, entry.message
            );
        }
    }
    info!("Delivery channel closed, delivery task exiting");
}

/// Resolve the target and send the reminder text
async fn deliver(http: &Http, entry: &ReminderEntry) -> Result<()> {
    match entry.target {
        Target::User(id) => {
            let dm = UserId(id)
                .create_dm_channel(http)
                .await
                .with_context(|| format!("could not resolve user {id}"))?;
            info!("Sending reminder to {}", dm.recipient.name);
            dm.say(http, &entry.message)
                .await
                .with_context(|| format!("could not DM user {id}"))?;
        }
        Target::Channel(id) => {
            info!("Sending reminder to channel {id}");
            ChannelId(id)
                .say(http, &entry.message)
                .await
                .with_context(|| format!("could not send to channel {id}"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_confirms_enqueue() {
        let (bridge, mut rx) = DeliveryBridge::new();
        let entry = ReminderEntry::new(Target::User(42), 300.0, "Take out the trash");

        bridge.submit(entry).unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.target, Target::User(42));
        assert_eq!(received.message, "Take out the trash");
    }

    #[tokio::test]
    async fn test_submit_preserves_order() {
        let (bridge, mut rx) = DeliveryBridge::new();
        for i in 0..3 {
            bridge
                .submit(ReminderEntry::new(Target::Channel(9), i as f64, format!("r{i}")))
                .unwrap();
        }
        for i in 0..3 {
            assert_eq!(rx.recv().await.unwrap().message, format!("r{i}"));
        }
    }

    #[tokio::test]
    async fn test_submit_fails_after_receiver_dropped() {
        let (bridge, rx) = DeliveryBridge::new();
        drop(rx);

        let result = bridge.submit(ReminderEntry::new(Target::User(1), 0.0, "lost"));
        assert!(result.is_err());
    }

    #[test]
    fn test_submit_works_from_plain_thread() {
        // The engine side is a non-async OS thread; submission must not
        // require a runtime context.
        let (bridge, mut rx) = DeliveryBridge::new();
        std::thread::spawn(move || {
            bridge
                .submit(ReminderEntry::new(Target::User(7), 1.0, "from thread"))
                .unwrap();
        })
        .join()
        .unwrap();

        let received = rx.blocking_recv().unwrap();
        assert_eq!(received.message, "from thread");
    }
}
