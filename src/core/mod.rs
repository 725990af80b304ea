//! # Core Module
//!
//! Configuration and shared Discord utilities for the bot.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod config;
pub mod response;

// Re-export commonly used items
pub use config::Config;
pub use response::{batch_lines, truncate_for_message, MESSAGE_LIMIT};
