//! Message trigger handler trait
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use async_trait::async_trait;
use serenity::model::channel::Message;
use serenity::prelude::Context;

/// How a trigger word is matched against an inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// The message author's tag equals the trigger
    Author,
    /// The lowercased first word of the message equals the trigger
    FirstWord,
    /// The lowercased message content contains the trigger anywhere
    Contains,
}

/// Trait for message trigger handlers
///
/// Each handler processes one or more trigger words. Handlers are
/// registered with a [`TriggerRegistry`](super::TriggerRegistry) under the
/// words they answer to and dispatched per message.
///
/// # Example
///
/// ```ignore
/// pub struct PingHandler;
///
/// #[async_trait]
/// impl TriggerHandler for PingHandler {
///     async fn handle(
///         &self,
///         ctx: &Context,
///         msg: &Message,
///         _kind: TriggerKind,
///         _trigger: &str,
///     ) -> Result<()> {
///         msg.channel_id.say(&ctx.http, "pong").await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait TriggerHandler: Send + Sync {
    /// Handle a triggered message
    ///
    /// # Arguments
    ///
    /// * `ctx` - Serenity context for Discord API calls
    /// * `msg` - The message that matched
    /// * `kind` - Which matching rule fired
    /// * `trigger` - The trigger word that matched
    async fn handle(
        &self,
        ctx: &Context,
        msg: &Message,
        kind: TriggerKind,
        trigger: &str,
    ) -> Result<()>;
}
