//! # Reminders Feature
//!
//! Durable scheduled reminders: a mutex-guarded min-heap of pending
//! entries, a background engine thread that fires and snapshots them, and
//! a channel bridge onto the gateway runtime for actual delivery.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: true

pub mod bridge;
pub mod engine;
pub mod entry;
pub mod parser;
pub mod queue;
pub mod store;

pub use entry::{ReminderEntry, Target};
pub use queue::ReminderQueue;
pub use store::{ReminderStore, REMINDERS_FILE};

use anyhow::{Context as AnyhowContext, Result};
use async_trait::async_trait;
use log::info;
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::triggers::{TriggerHandler, TriggerKind};
use bridge::DeliveryBridge;
use engine::ReminderEngine;
use entry::unix_now;
use parser::parse_remind;

/// Running reminder subsystem
///
/// Created once at startup when the feature is enabled. Holds the shared
/// queue; the engine thread and delivery task run detached for the
/// process lifetime.
pub struct ReminderService {
    queue: Arc<ReminderQueue>,
}

impl ReminderService {
    /// Load persisted state and start the engine thread and delivery task
    ///
    /// Must be called from within the gateway runtime. Fails when the
    /// snapshot file is corrupt (startup should stop rather than discard
    /// scheduled reminders) or the engine thread cannot be spawned.
    pub fn start(store: ReminderStore, http: Arc<Http>, save_ticks: u32) -> Result<Self> {
        let entries = store.load()?;
        let queue = Arc::new(ReminderQueue::from_entries(entries));

        let (delivery_bridge, rx) = DeliveryBridge::new();
        tokio::spawn(bridge::delivery_loop(rx, http));

        ReminderEngine::new(Arc::clone(&queue), store, delivery_bridge, save_ticks)
            .spawn()
            .context("failed to spawn reminder engine thread")?;

        Ok(ReminderService { queue })
    }

    /// The trigger handler for the `remind` command
    pub fn handler(&self) -> Arc<RemindHandler> {
        Arc::new(RemindHandler {
            queue: Arc::clone(&self.queue),
        })
    }

    /// Number of reminders currently pending
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

/// Handler for the `remind` first-word trigger
pub struct RemindHandler {
    queue: Arc<ReminderQueue>,
}

#[async_trait]
impl TriggerHandler for RemindHandler {
    async fn handle(
        &self,
        ctx: &Context,
        msg: &Message,
        _kind: TriggerKind,
        _trigger: &str,
    ) -> Result<()> {
        match parse_remind(&msg.content, msg.author.id.0, msg.channel_id.0, unix_now()) {
            Ok(reminder) => {
                info!(
                    "Scheduled reminder for {:?} at {}",
                    reminder.target, reminder.due_at
                );
                self.queue.insert(reminder);
                msg.channel_id.say(&ctx.http, "ok").await?;
            }
            Err(parse_error) => {
                msg.channel_id.say(&ctx.http, parse_error.reply()).await?;
            }
        }
        Ok(())
    }
}
