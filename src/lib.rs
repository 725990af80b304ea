// Core layer - shared types and configuration
pub mod core;

// Features layer - all feature modules
pub mod features;

// Application layer - message trigger dispatch
pub mod triggers;

// Re-export core config for convenience
pub use crate::core::Config;

// Re-export feature items
pub use features::{
    // Booru search
    BooruHandler,
    // Chatbot relay
    ChatbotHandler,
    // Misc handlers
    ChooseHandler, LinuxHandler, RandomReactions,
    // Reminders
    ReminderService, ReminderStore,
    // Canned responses
    ResponseConfig,
    // Profile lookup
    WaifuHandler,
};

// Re-export dispatch items
pub use triggers::{Dispatcher, TriggerHandler, TriggerKind, TriggerRegistry};
