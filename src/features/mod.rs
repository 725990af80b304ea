//! # Features Layer
//!
//! Each feature is a self-contained module exposing trigger handlers
//! and/or background services, wired together by the binary.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

pub mod booru;
pub mod chatbot;
pub mod misc;
pub mod reminders;
pub mod responses;
pub mod waifu;

// Re-export the items the binary wires together
pub use booru::BooruHandler;
pub use chatbot::ChatbotHandler;
pub use misc::{ChooseHandler, LinuxHandler, RandomReactions};
pub use reminders::{ReminderService, ReminderStore};
pub use responses::ResponseConfig;
pub use waifu::WaifuHandler;
