//! Trigger word registry
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use std::collections::HashMap;
use std::sync::Arc;

use super::handler::{TriggerHandler, TriggerKind};

/// Registry mapping trigger words to handlers, per matching rule
///
/// Words are stored lowercased for the case-insensitive rules
/// (first-word and contains); author tags keep their case. A handler may
/// be registered under any number of words.
///
/// # Example
///
/// ```ignore
/// let mut registry = TriggerRegistry::new();
/// registry.register(TriggerKind::FirstWord, "remind", remind_handler);
/// registry.register(TriggerKind::Contains, "linux", linux_handler);
/// ```
#[derive(Default)]
pub struct TriggerRegistry {
    author: HashMap<String, Arc<dyn TriggerHandler>>,
    first_word: HashMap<String, Arc<dyn TriggerHandler>>,
    contains: HashMap<String, Arc<dyn TriggerHandler>>,
}

impl TriggerRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one trigger word
    pub fn register(
        &mut self,
        kind: TriggerKind,
        word: impl Into<String>,
        handler: Arc<dyn TriggerHandler>,
    ) {
        let word = word.into();
        match kind {
            TriggerKind::Author => self.author.insert(word, handler),
            TriggerKind::FirstWord => self.first_word.insert(word.to_lowercase(), handler),
            TriggerKind::Contains => self.contains.insert(word.to_lowercase(), handler),
        };
    }

    /// Look up the handler for an exact-match rule
    ///
    /// Returns None for [`TriggerKind::Contains`], which is matched by
    /// scanning [`contains_triggers`](Self::contains_triggers) instead.
    pub fn get(&self, kind: TriggerKind, word: &str) -> Option<Arc<dyn TriggerHandler>> {
        match kind {
            TriggerKind::Author => self.author.get(word).cloned(),
            TriggerKind::FirstWord => self.first_word.get(word).cloned(),
            TriggerKind::Contains => None,
        }
    }

    /// Iterate the substring triggers and their handlers
    pub fn contains_triggers(
        &self,
    ) -> impl Iterator<Item = (&String, &Arc<dyn TriggerHandler>)> {
        self.contains.iter()
    }

    /// Total number of registered trigger words across all rules
    pub fn len(&self) -> usize {
        self.author.len() + self.first_word.len() + self.contains.len()
    }

    /// Check if the registry has no triggers at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
