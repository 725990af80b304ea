//! # Image-board Search Feature
//!
//! Random image search against the Danbooru API via the `danr` and
//! `spam` triggers.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: true

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{info, warn};
use serde_json::Value;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::time::Duration;

use crate::core::response::batch_lines;
use crate::triggers::{TriggerHandler, TriggerKind};

const POSTS_URL: &str = "https://danbooru.donmai.us/posts.json";

/// Upstream cap on a single request
const MAX_REQUEST_SIZE: i64 = 200;

/// Links sent per reply message
const URLS_PER_MESSAGE: usize = 5;

/// Handler for the `danr` (one random image) and `spam <amount> [tags…]`
/// triggers
pub struct BooruHandler {
    client: reqwest::Client,
    /// (login, api key); anonymous access is limited to one random tag
    credentials: Option<(String, String)>,
}

impl BooruHandler {
    pub fn new(credentials: Option<(String, String)>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(BooruHandler {
            client,
            credentials,
        })
    }

    async fn process(
        &self,
        ctx: &Context,
        msg: &Message,
        amount: i64,
        mut tags: Vec<String>,
    ) -> Result<()> {
        if amount > MAX_REQUEST_SIZE {
            msg.channel_id
                .say(
                    &ctx.http,
                    format!(
                        ":warning:Note: Danbooru doesn't allow requests over {MAX_REQUEST_SIZE} in size. This request will be limited"
                    ),
                )
                .await?;
        }
        if self.credentials.is_none() && tags.len() > 1 {
            msg.channel_id
                .say(
                    &ctx.http,
                    ":warning:Note: Danbooru doesn't allow searching on more than 1 random tag at once. Search will be limited to your first tag",
                )
                .await?;
            tags.truncate(1);
        }

        info!("Booru request for {amount} image(s) with tags: {tags:?}");
        let urls = match self.fetch(amount, &tags).await {
            Ok(urls) => urls,
            Err(e) => {
                warn!("Booru request failed: {e:#}");
                msg.channel_id
                    .say(
                        &ctx.http,
                        "Error while getting content. Maybe the booru api is down or malfunctioning?",
                    )
                    .await?;
                return Ok(());
            }
        };

        if urls.is_empty() {
            msg.channel_id
                .say(
                    &ctx.http,
                    "No result found. Find better tags: https://www.donmai.us/tags",
                )
                .await?;
            return Ok(());
        }

        info!("Booru returned {} usable image url(s)", urls.len());
        let progress = if urls.len() > 1 {
            Some(
                msg.channel_id
                    .say(
                        &ctx.http,
                        format!("Retrieved {} results. Sending now", urls.len()),
                    )
                    .await?,
            )
        } else {
            None
        };

        for batch in batch_lines(&urls, URLS_PER_MESSAGE) {
            msg.channel_id.say(&ctx.http, batch).await?;
        }

        if let Some(progress) = progress {
            let _ = progress.delete(&ctx.http).await;
        }
        Ok(())
    }

    /// Query the posts endpoint and collect usable image URLs
    async fn fetch(&self, amount: i64, tags: &[String]) -> Result<Vec<String>> {
        let limit = over_fetch_limit(amount);
        let mut request_tags = tags.to_vec();
        request_tags.push(format!("random:{limit}"));

        let mut query = vec![
            ("limit", limit.to_string()),
            ("tags", request_tags.join(" ")),
        ];
        if let Some((login, api_key)) = &self.credentials {
            query.push(("login", login.clone()));
            query.push(("api_key", api_key.clone()));
        }

        let response = self.client.get(POSTS_URL).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("booru api returned HTTP {status}"));
        }
        let body: Value = response.json().await?;
        // The API reports errors as an object instead of the posts array
        if let Some(message) = body.get("message") {
            return Err(anyhow!("booru api failure: {message}"));
        }
        Ok(extract_urls(&body, amount))
    }
}

/// Request more posts than asked for; the API sometimes returns entries
/// without a usable file url and the surplus covers the holes
fn over_fetch_limit(amount: i64) -> i64 {
    let amount = amount.max(0);
    amount + 3.max((amount + 3) / 4)
}

/// Pull up to `amount` direct file URLs from a posts array, skipping
/// posts without one and zip archives (ugoira)
fn extract_urls(posts: &Value, amount: i64) -> Vec<String> {
    let Some(posts) = posts.as_array() else {
        return Vec::new();
    };
    posts
        .iter()
        .filter_map(|post| post.get("file_url").and_then(Value::as_str))
        .filter(|url| !url.ends_with(".zip"))
        .take(amount.max(0) as usize)
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl TriggerHandler for BooruHandler {
    async fn handle(
        &self,
        ctx: &Context,
        msg: &Message,
        _kind: TriggerKind,
        trigger: &str,
    ) -> Result<()> {
        let params: Vec<String> = msg
            .content
            .split_whitespace()
            .skip(1)
            .map(str::to_string)
            .collect();

        match trigger {
            "danr" => {
                let _ = msg.channel_id.broadcast_typing(&ctx.http).await;
                self.process(ctx, msg, 1, params).await
            }
            "spam" => {
                let amount = match params.first().and_then(|p| p.parse::<i64>().ok()) {
                    Some(amount) if amount >= 1 => amount,
                    Some(_) => {
                        msg.channel_id.say(&ctx.http, ":thinking:").await?;
                        return Ok(());
                    }
                    None => {
                        msg.channel_id
                            .say(&ctx.http, "Usage: `spam <amount> <optional space separated tags>`")
                            .await?;
                        return Ok(());
                    }
                };
                let _ = msg.channel_id.broadcast_typing(&ctx.http).await;
                self.process(ctx, msg, amount, params[1..].to_vec()).await
            }
            other => Err(anyhow!("booru handler got unknown trigger '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_over_fetch_limit_has_floor_of_three() {
        assert_eq!(over_fetch_limit(1), 4);
        assert_eq!(over_fetch_limit(5), 8);
        assert_eq!(over_fetch_limit(8), 11);
    }

    #[test]
    fn test_over_fetch_limit_scales_with_amount() {
        assert_eq!(over_fetch_limit(100), 125);
        assert_eq!(over_fetch_limit(200), 250);
    }

    #[test]
    fn test_extract_urls_takes_amount() {
        let posts = json!([
            {"file_url": "https://cdn/a.png"},
            {"file_url": "https://cdn/b.jpg"},
            {"file_url": "https://cdn/c.gif"},
        ]);
        assert_eq!(
            extract_urls(&posts, 2),
            vec!["https://cdn/a.png", "https://cdn/b.jpg"]
        );
    }

    #[test]
    fn test_extract_urls_skips_bad_posts() {
        let posts = json!([
            {"id": 1},
            {"file_url": "https://cdn/animation.zip"},
            {"file_url": "https://cdn/good.png"},
        ]);
        assert_eq!(extract_urls(&posts, 5), vec!["https://cdn/good.png"]);
    }

    #[test]
    fn test_extract_urls_non_array_is_empty() {
        assert!(extract_urls(&json!({"message": "throttled"}), 3).is_empty());
        assert!(extract_urls(&json!([]), 3).is_empty());
    }
}
