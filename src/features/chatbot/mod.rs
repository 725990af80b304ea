//! # Chatbot Relay Feature
//!
//! Relays messages that mention the bot to the cleverbot.com API,
//! keeping one conversation per channel.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: true

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use log::{info, warn};
use rand::Rng;
use serde_json::Value;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::time::Duration;

use crate::features::reminders::entry::unix_now;
use crate::triggers::{TriggerHandler, TriggerKind};

const REPLY_URL: &str = "https://www.cleverbot.com/getreply";

/// Seconds of inactivity after which a channel conversation restarts
const CONVERSATION_IDLE_SECS: f64 = 180.0;

const APOLOGY: &str = "Sorry, I am asleep (actually I'm probably just broken)";

/// Per-channel conversation state carried between requests
#[derive(Debug, Clone)]
struct Conversation {
    tweak1: u8,
    tweak2: u8,
    tweak3: u8,
    conversation_id: Option<String>,
    cs: Option<String>,
    last_activity: f64,
}

impl Conversation {
    /// Fresh conversation with randomized personality tweaks
    fn new(now: f64) -> Self {
        let mut rng = rand::rng();
        Conversation {
            tweak1: rng.random_range(0..=100),
            tweak2: rng.random_range(0..=100),
            tweak3: rng.random_range(0..=100),
            conversation_id: None,
            cs: None,
            last_activity: now,
        }
    }

    fn is_stale(&self, now: f64) -> bool {
        now - self.last_activity > CONVERSATION_IDLE_SECS
    }
}

/// Handler for the bot-mention trigger
pub struct ChatbotHandler {
    client: reqwest::Client,
    api_key: String,
    conversations: DashMap<u64, Conversation>,
}

impl ChatbotHandler {
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(ChatbotHandler {
            client,
            api_key,
            conversations: DashMap::new(),
        })
    }

    /// Continue the channel's conversation or start a new one
    fn conversation_for(&self, channel_id: u64, now: f64) -> Conversation {
        match self.conversations.get(&channel_id) {
            Some(convo) if !convo.is_stale(now) => {
                info!("Continuing existing chatbot conversation in {channel_id}");
                convo.clone()
            }
            _ => {
                info!("Starting new chatbot conversation in {channel_id}");
                Conversation::new(now)
            }
        }
    }

    async fn exchange(&self, convo: &Conversation, input: &str) -> Result<(String, Conversation)> {
        let mut query = vec![
            ("input", input.to_string()),
            ("key", self.api_key.clone()),
            ("cb_settings_tweak1", convo.tweak1.to_string()),
            ("cb_settings_tweak2", convo.tweak2.to_string()),
            ("cb_settings_tweak3", convo.tweak3.to_string()),
        ];
        if let Some(id) = &convo.conversation_id {
            query.push(("conversation_id", id.clone()));
        }
        if let Some(cs) = &convo.cs {
            query.push(("cs", cs.clone()));
        }

        let response = self.client.get(REPLY_URL).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("bad response from cleverbot: {status}"));
        }
        let body: Value = response.json().await?;
        let output = body
            .get("output")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("cleverbot response had no output field"))?
            .to_string();

        let mut updated = convo.clone();
        updated.conversation_id = body
            .get("conversation_id")
            .and_then(Value::as_str)
            .map(str::to_string);
        updated.cs = body.get("cs").and_then(Value::as_str).map(str::to_string);
        updated.last_activity = unix_now();
        Ok((output, updated))
    }
}

#[async_trait]
impl TriggerHandler for ChatbotHandler {
    async fn handle(
        &self,
        ctx: &Context,
        msg: &Message,
        _kind: TriggerKind,
        _trigger: &str,
    ) -> Result<()> {
        let _ = msg.channel_id.broadcast_typing(&ctx.http).await;

        // Everything after the mention token is the actual input
        let input = msg
            .content
            .split_once(char::is_whitespace)
            .map(|(_, rest)| rest.trim())
            .unwrap_or("");

        let channel_id = msg.channel_id.0;
        let convo = self.conversation_for(channel_id, unix_now());
        info!("Chatbot input from {}: {input}", msg.author.tag());

        match self.exchange(&convo, input).await {
            Ok((output, updated)) => {
                msg.channel_id.say(&ctx.http, &output).await?;
                self.conversations.insert(channel_id, updated);
            }
            Err(e) => {
                // Keep the stored conversation untouched so a transient
                // API failure doesn't reset the thread of conversation.
                warn!("Chatbot call failed: {e:#}");
                msg.channel_id.say(&ctx.http, APOLOGY).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_conversation_tweaks_in_range() {
        for _ in 0..50 {
            let convo = Conversation::new(0.0);
            assert!(convo.tweak1 <= 100);
            assert!(convo.tweak2 <= 100);
            assert!(convo.tweak3 <= 100);
            assert!(convo.conversation_id.is_none());
            assert!(convo.cs.is_none());
        }
    }

    #[test]
    fn test_conversation_staleness_window() {
        let convo = Conversation::new(1000.0);
        assert!(!convo.is_stale(1000.0));
        assert!(!convo.is_stale(1180.0));
        assert!(convo.is_stale(1180.1));
    }

    #[test]
    fn test_conversation_for_replaces_stale_state() {
        let handler = ChatbotHandler::new("key".into()).unwrap();
        let mut convo = Conversation::new(1000.0);
        convo.conversation_id = Some("abc".into());
        handler.conversations.insert(7, convo);

        // Within the idle window the stored conversation comes back
        let same = handler.conversation_for(7, 1100.0);
        assert_eq!(same.conversation_id.as_deref(), Some("abc"));

        // After the window a fresh conversation replaces it
        let fresh = handler.conversation_for(7, 5000.0);
        assert!(fresh.conversation_id.is_none());
    }

    #[test]
    fn test_unknown_channel_gets_fresh_conversation() {
        let handler = ChatbotHandler::new("key".into()).unwrap();
        let convo = handler.conversation_for(99, 1.0);
        assert!(convo.conversation_id.is_none());
    }
}
