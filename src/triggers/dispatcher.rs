//! Message dispatch across registered triggers
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use log::{debug, error, info};
use serenity::model::channel::Message;
use serenity::prelude::Context;
use uuid::Uuid;

use super::handler::TriggerKind;
use super::registry::TriggerRegistry;

/// Fans an inbound message out to every matching trigger handler
///
/// A message can match several rules at once (author, first word, any
/// number of substrings); all of them run, and a failing handler is
/// logged without stopping the rest.
pub struct Dispatcher {
    registry: TriggerRegistry,
}

impl Dispatcher {
    pub fn new(registry: TriggerRegistry) -> Self {
        Dispatcher { registry }
    }

    /// Dispatch one message event
    pub async fn handle_message(&self, ctx: &Context, msg: &Message) {
        // Never let the bot trigger itself or other bots
        if msg.author.bot {
            return;
        }

        let request_id = Uuid::new_v4();
        let content_lower = msg.content.to_lowercase();
        debug!(
            "[{request_id}] Message from {} in {}: '{}'",
            msg.author.tag(),
            msg.channel_id,
            msg.content.chars().take(100).collect::<String>()
        );

        let author_tag = msg.author.tag();
        if let Some(handler) = self.registry.get(TriggerKind::Author, &author_tag) {
            info!("[{request_id}] Author trigger matched: {author_tag}");
            if let Err(e) = handler
                .handle(ctx, msg, TriggerKind::Author, &author_tag)
                .await
            {
                error!("[{request_id}] Author handler '{author_tag}' failed: {e:#}");
            }
        }

        if let Some(first_word) = first_word(&content_lower) {
            if let Some(handler) = self.registry.get(TriggerKind::FirstWord, first_word) {
                info!("[{request_id}] First-word trigger matched: {first_word}");
                if let Err(e) = handler
                    .handle(ctx, msg, TriggerKind::FirstWord, first_word)
                    .await
                {
                    error!("[{request_id}] First-word handler '{first_word}' failed: {e:#}");
                }
            }
        }

        for (phrase, handler) in self.registry.contains_triggers() {
            if content_lower.contains(phrase.as_str()) {
                info!("[{request_id}] Contains trigger matched: {phrase}");
                if let Err(e) = handler
                    .handle(ctx, msg, TriggerKind::Contains, phrase)
                    .await
                {
                    error!("[{request_id}] Contains handler '{phrase}' failed: {e:#}");
                }
            }
        }
    }

    /// Number of registered trigger words
    pub fn trigger_count(&self) -> usize {
        self.registry.len()
    }
}

/// First whitespace-separated token of a message, if any
fn first_word(content: &str) -> Option<&str> {
    content.split_whitespace().next()
}
