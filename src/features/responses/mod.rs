//! # Canned Response Feature
//!
//! YAML-defined trigger table: each entry maps a trigger word to a fixed
//! reply, letting server admins add simple responses without code.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: true

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::triggers::{TriggerHandler, TriggerKind, TriggerRegistry};

/// Root configuration containing all canned responses
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResponseConfig {
    pub responses: Vec<CannedResponse>,
}

/// A single trigger-to-reply mapping
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CannedResponse {
    /// Word or phrase to match
    pub trigger: String,

    /// Matching rule; defaults to first-word
    #[serde(default)]
    pub kind: ResponseKind,

    /// Reply sent verbatim when the trigger matches
    pub message: String,
}

/// Matching rule for a canned response entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    #[default]
    FirstWord,
    Contains,
    Author,
}

impl From<ResponseKind> for TriggerKind {
    fn from(kind: ResponseKind) -> Self {
        match kind {
            ResponseKind::FirstWord => TriggerKind::FirstWord,
            ResponseKind::Contains => TriggerKind::Contains,
            ResponseKind::Author => TriggerKind::Author,
        }
    }
}

impl ResponseConfig {
    /// Load the response table from a YAML file
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ResponseConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Create an empty configuration
    pub fn empty() -> Self {
        Self { responses: vec![] }
    }

    /// Validate all entries in the configuration
    pub fn validate(&self) -> Result<()> {
        for response in &self.responses {
            if response.trigger.trim().is_empty() {
                return Err(anyhow::anyhow!("canned response with empty trigger"));
            }

            // First-word and author rules match whole tokens; a trigger
            // with internal whitespace could never fire
            if response.kind != ResponseKind::Contains
                && response.trigger.split_whitespace().count() > 1
            {
                return Err(anyhow::anyhow!(
                    "trigger '{}' has whitespace and would never match as {:?}",
                    response.trigger,
                    response.kind
                ));
            }

            if response.message.is_empty() {
                return Err(anyhow::anyhow!(
                    "canned response '{}' has an empty message",
                    response.trigger
                ));
            }
        }
        Ok(())
    }

    /// Register one handler per entry into the trigger registry
    pub fn register_into(&self, registry: &mut TriggerRegistry) {
        for response in &self.responses {
            registry.register(
                response.kind.into(),
                response.trigger.clone(),
                Arc::new(SimpleResponseHandler {
                    message: response.message.clone(),
                }),
            );
        }
    }
}

/// Replies with a fixed message whenever its trigger matches
pub struct SimpleResponseHandler {
    message: String,
}

#[async_trait]
impl TriggerHandler for SimpleResponseHandler {
    async fn handle(
        &self,
        ctx: &Context,
        msg: &Message,
        _kind: TriggerKind,
        _trigger: &str,
    ) -> Result<()> {
        msg.channel_id.say(&ctx.http, &self.message).await?;
        Ok(())
    }
}
