//! # Misc Handlers
//!
//! Small self-contained message handlers: random option picking, the
//! GNU/Linux interjection, and random reaction sprinkling.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use rand::seq::IndexedRandom;
use rand::Rng;
use serenity::model::channel::{Message, ReactionType};
use serenity::prelude::Context;

use crate::triggers::{TriggerHandler, TriggerKind};

const INTERJECTION: &str = "I'd just like to interject for moment. What you're refering to as Linux, is in fact, GNU/Linux, or as I've recently taken to calling it, GNU plus Linux. Linux is not an operating system unto itself, but rather another free component of a fully functioning GNU system made useful by the GNU corelibs, shell utilities and vital system components comprising a full OS as defined by POSIX.\nMany computer users run a modified version of the GNU system every day, without realizing it. Through a peculiar turn of events, the version of GNU which is widely used today is often called Linux, and many of its users are not aware that it is basically the GNU system, developed by the GNU Project.\nThere really is a Linux, and these people are using it, but it is just a part of the system they use. Linux is the kernel: the program in the system that allocates the machine's resources to the other programs that you run. The kernel is an essential part of an operating system, but useless by itself; it can only function in the context of a complete operating system. Linux is normally used in combination with the GNU operating system: the whole system is basically GNU with Linux added, or GNU/Linux. All the so-called Linux distributions are really distributions of GNU/Linux!";

/// Handler for the `choose` first-word trigger: picks one of the given
/// options uniformly at random
pub struct ChooseHandler;

#[async_trait]
impl TriggerHandler for ChooseHandler {
    async fn handle(
        &self,
        ctx: &Context,
        msg: &Message,
        _kind: TriggerKind,
        _trigger: &str,
    ) -> Result<()> {
        let options: Vec<&str> = msg.content.split_whitespace().skip(1).collect();
        let reply = {
            let mut rng = rand::rng();
            options
                .choose(&mut rng)
                .map(|choice| choice.to_string())
                .unwrap_or_else(|| "Usage: `choose <option> <option> ...`".to_string())
        };
        msg.channel_id.say(&ctx.http, reply).await?;
        Ok(())
    }
}

/// Handler for the `linux` contains-trigger
///
/// Stays quiet only when every occurrence of "linux" is directly preceded
/// by `gnu/` or `gnu plus `.
pub struct LinuxHandler;

/// Whether any occurrence of "linux" lacks its GNU attribution
fn needs_interjection(content_lower: &str) -> bool {
    for (index, _) in content_lower.match_indices("linux") {
        // Too close to the start for any prefix to fit
        if index < 4 {
            return true;
        }
        let gnu_slash = content_lower.get(index - 4..index) == Some("gnu/");
        let gnu_plus = index >= 9 && content_lower.get(index - 9..index) == Some("gnu plus ");
        if !(gnu_slash || gnu_plus) {
            return true;
        }
    }
    false
}

#[async_trait]
impl TriggerHandler for LinuxHandler {
    async fn handle(
        &self,
        ctx: &Context,
        msg: &Message,
        _kind: TriggerKind,
        _trigger: &str,
    ) -> Result<()> {
        if needs_interjection(&msg.content.to_lowercase()) {
            msg.channel_id.say(&ctx.http, INTERJECTION).await?;
        }
        Ok(())
    }
}

/// Occasionally reacts to inbound messages with a configured emoji
/// sequence, applied one character at a time
pub struct RandomReactions {
    frequency: f64,
    values: Vec<String>,
}

impl RandomReactions {
    pub fn new(frequency: f64, values: Vec<String>) -> Self {
        RandomReactions { frequency, values }
    }

    /// Roll the dice for this message and react if it comes up
    pub async fn maybe_react(&self, ctx: &Context, msg: &Message) {
        if self.values.is_empty() {
            return;
        }
        let reaction = {
            let mut rng = rand::rng();
            if rng.random::<f64>() >= self.frequency {
                return;
            }
            self.values.choose(&mut rng).cloned()
        };
        let Some(reaction) = reaction else { return };

        debug!("Reacting to message {} with '{reaction}'", msg.id);
        for ch in reaction.chars() {
            if let Err(e) = msg
                .react(&ctx.http, ReactionType::Unicode(ch.to_string()))
                .await
            {
                debug!("Failed to add reaction '{ch}': {e}");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interjection_on_bare_linux() {
        assert!(needs_interjection("i use linux btw"));
        assert!(needs_interjection("linux"));
    }

    #[test]
    fn test_no_interjection_when_attributed() {
        assert!(!needs_interjection("i use gnu/linux btw"));
        assert!(!needs_interjection("gnu plus linux forever"));
        assert!(!needs_interjection("no kernel talk here"));
    }

    #[test]
    fn test_interjection_when_any_occurrence_is_bare() {
        assert!(needs_interjection("gnu/linux is fine but linux alone is not"));
    }

    #[test]
    fn test_all_occurrences_attributed() {
        assert!(!needs_interjection("gnu/linux and gnu plus linux"));
    }

    #[test]
    fn test_occurrence_near_start() {
        // "gnu/" cannot possibly fit before index 4
        assert!(needs_interjection("linux rocks"));
        assert!(needs_interjection("a linux"));
    }

    #[test]
    fn test_multibyte_prefix_does_not_panic() {
        assert!(needs_interjection("日本語 linux"));
    }
}
