//! # Profile Lookup Feature
//!
//! Fetches a random character profile from mywaifulist.moe: scrapes the
//! profile id off the random page, then queries the JSON API for the
//! details.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: true

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::warn;
use scraper::{Html, Selector};
use serde_json::Value;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::time::Duration;

use crate::core::response::truncate_for_message;
use crate::triggers::{TriggerHandler, TriggerKind};

const RANDOM_URL: &str = "https://mywaifulist.moe/random";
const API_URL: &str = "https://mywaifulist.moe/api/waifu";

const ERROR_MESSAGE: &str = "There was an error fetching a waifu! Sorry!";

/// Redraws allowed when the random page lands on a husbando
const MAX_ATTEMPTS: usize = 5;

/// Handler for the `waifu` first-word trigger
pub struct WaifuHandler {
    client: reqwest::Client,
}

impl WaifuHandler {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(WaifuHandler { client })
    }

    async fn lookup(&self) -> Result<Option<Value>> {
        for _ in 0..MAX_ATTEMPTS {
            let page = self.client.get(RANDOM_URL).send().await?;
            let status = page.status();
            if !status.is_success() {
                return Err(anyhow!("random page returned HTTP {status}"));
            }
            let profile_id = scrape_profile_id(&page.text().await?)?;

            let response = self
                .client
                .get(format!("{API_URL}/{profile_id}"))
                .header("X-Requested-With", "XMLHttpRequest")
                .send()
                .await?;
            let status = response.status();
            if !status.is_success() {
                return Err(anyhow!("profile api returned HTTP {status}"));
            }
            let body: Value = response.json().await?;

            // Redraw on husbandos; the trigger promises a waifu
            if is_husbando(&body) {
                continue;
            }
            return Ok(Some(body));
        }
        Ok(None)
    }
}

/// Pull the profile id out of the random page markup
fn scrape_profile_id(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse("waifu-core").map_err(|e| anyhow!("invalid selector: {e:?}"))?;
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr(":waifu-id"))
        .map(str::to_string)
        .ok_or_else(|| anyhow!("random page had no waifu-core element"))
}

fn is_husbando(body: &Value) -> bool {
    body.pointer("/data/husbando")
        .is_some_and(|flag| flag.as_bool().unwrap_or(false) || flag.as_i64().unwrap_or(0) != 0)
}

/// Build the two reply messages from a profile payload
fn format_profile(body: &Value, trigger: &str) -> Option<(String, String)> {
    let data = body.get("data")?;
    let name = data.get("name")?.as_str()?;
    let series = data.pointer("/series/name").and_then(Value::as_str)?;
    let picture = data.get("display_picture")?.as_str()?;
    let description = data
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("");

    Some((
        format!("Your {trigger} is {name} from {series}\n{picture}"),
        truncate_for_message(description),
    ))
}

#[async_trait]
impl TriggerHandler for WaifuHandler {
    async fn handle(
        &self,
        ctx: &Context,
        msg: &Message,
        _kind: TriggerKind,
        trigger: &str,
    ) -> Result<()> {
        let _ = msg.channel_id.broadcast_typing(&ctx.http).await;

        let body = match self.lookup().await {
            Ok(Some(body)) => body,
            Ok(None) => {
                warn!("Profile lookup drew husbandos {MAX_ATTEMPTS} times in a row");
                msg.channel_id.say(&ctx.http, ERROR_MESSAGE).await?;
                return Ok(());
            }
            Err(e) => {
                warn!("Profile lookup failed: {e:#}");
                msg.channel_id.say(&ctx.http, ERROR_MESSAGE).await?;
                return Ok(());
            }
        };

        match format_profile(&body, trigger) {
            Some((headline, description)) => {
                msg.channel_id.say(&ctx.http, headline).await?;
                if !description.is_empty() {
                    msg.channel_id.say(&ctx.http, description).await?;
                }
            }
            None => {
                warn!("Profile payload was missing expected fields");
                msg.channel_id.say(&ctx.http, ERROR_MESSAGE).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scrape_profile_id() {
        let html = r#"<html><body><waifu-core :waifu-id="4321"></waifu-core></body></html>"#;
        assert_eq!(scrape_profile_id(html).unwrap(), "4321");
    }

    #[test]
    fn test_scrape_profile_id_missing_element() {
        assert!(scrape_profile_id("<html><body></body></html>").is_err());
    }

    #[test]
    fn test_is_husbando_variants() {
        assert!(is_husbando(&json!({"data": {"husbando": true}})));
        assert!(is_husbando(&json!({"data": {"husbando": 1}})));
        assert!(!is_husbando(&json!({"data": {"husbando": false}})));
        assert!(!is_husbando(&json!({"data": {"husbando": 0}})));
        assert!(!is_husbando(&json!({"data": {}})));
    }

    #[test]
    fn test_format_profile() {
        let body = json!({
            "data": {
                "name": "Holo",
                "series": {"name": "Spice and Wolf"},
                "display_picture": "https://img/holo.png",
                "description": "A wise wolf."
            }
        });
        let (headline, description) = format_profile(&body, "waifu").unwrap();
        assert_eq!(
            headline,
            "Your waifu is Holo from Spice and Wolf\nhttps://img/holo.png"
        );
        assert_eq!(description, "A wise wolf.");
    }

    #[test]
    fn test_format_profile_truncates_long_description() {
        let body = json!({
            "data": {
                "name": "N",
                "series": {"name": "S"},
                "display_picture": "p",
                "description": "x".repeat(3000)
            }
        });
        let (_, description) = format_profile(&body, "waifu").unwrap();
        assert!(description.len() <= crate::core::response::MESSAGE_LIMIT);
        assert!(description.ends_with("..."));
    }

    #[test]
    fn test_format_profile_missing_fields() {
        assert!(format_profile(&json!({"data": {"name": "x"}}), "waifu").is_none());
        assert!(format_profile(&json!({}), "waifu").is_none());
    }
}
