//! Environment-based bot configuration
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{anyhow, Context, Result};
use std::env;

/// Default number of engine ticks between reminder snapshots
pub const DEFAULT_REMIND_SAVE_TICKS: u32 = 300;

/// Runtime configuration loaded from environment variables
///
/// Call [`Config::from_env`] after `dotenvy::dotenv()` so values from a
/// local `.env` file are visible.
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token (required)
    pub discord_token: String,
    /// Default log filter passed to env_logger
    pub log_level: String,
    /// Whether the reminder subsystem is constructed at all
    pub remind_enabled: bool,
    /// Engine ticks between queue snapshots
    pub remind_save_ticks: u32,
    /// Whether random reactions are added to inbound messages
    pub random_reactions: bool,
    /// Probability (0.0 - 1.0) of reacting to any given message
    pub reaction_frequency: f64,
    /// Candidate reaction strings; one is chosen and applied char by char
    pub random_reaction_values: Vec<String>,
    /// Danbooru account login, enables multi-tag search when set with key
    pub danbooru_username: Option<String>,
    /// Danbooru API key
    pub danbooru_api_key: Option<String>,
    /// Cleverbot API key; chatbot relay is disabled when absent
    pub cleverbot_api_key: Option<String>,
    /// Path to the canned-response trigger table
    pub triggers_config_path: String,
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// Returns an error when the token is missing or a typed value fails
    /// to parse; optional integrations simply stay disabled when their
    /// keys are absent.
    pub fn from_env() -> Result<Self> {
        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| anyhow!("DISCORD_TOKEN environment variable is required"))?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let remind_enabled = parse_bool(&optional("REMIND_ENABLED").unwrap_or_else(|| "true".into()))
            .context("REMIND_ENABLED must be a boolean")?;
        let remind_save_ticks = match optional("REMIND_SAVE_TIME") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("REMIND_SAVE_TIME must be a tick count, got '{raw}'"))?,
            None => DEFAULT_REMIND_SAVE_TICKS,
        };

        let random_reactions =
            parse_bool(&optional("RANDOM_REACTIONS").unwrap_or_else(|| "false".into()))
                .context("RANDOM_REACTIONS must be a boolean")?;
        let reaction_frequency = match optional("REACTION_FREQUENCY") {
            Some(raw) => {
                let freq = raw.parse::<f64>().with_context(|| {
                    format!("REACTION_FREQUENCY must be a number between 0 and 1, got '{raw}'")
                })?;
                if !(0.0..=1.0).contains(&freq) {
                    return Err(anyhow!(
                        "REACTION_FREQUENCY must be between 0 and 1, got {freq}"
                    ));
                }
                freq
            }
            None => 0.01,
        };
        let random_reaction_values = optional("RANDOM_REACTION_VALUES")
            .map(|raw| parse_list(&raw))
            .unwrap_or_default();

        Ok(Config {
            discord_token,
            log_level,
            remind_enabled,
            remind_save_ticks,
            random_reactions,
            reaction_frequency,
            random_reaction_values,
            danbooru_username: optional("DANBOORU_USERNAME"),
            danbooru_api_key: optional("DANBOORU_API_KEY"),
            cleverbot_api_key: optional("CLEVERBOT_API_KEY"),
            triggers_config_path: optional("TRIGGERS_CONFIG_PATH")
                .unwrap_or_else(|| "triggers.yaml".to_string()),
        })
    }
}

/// Read an env var, treating empty strings as absent
fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a boolean setting, accepting true/false/1/0/yes/no
fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(anyhow!("expected a boolean, got '{other}'")),
    }
}

/// Split a comma-separated setting into trimmed non-empty values
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
