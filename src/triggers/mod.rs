//! # Trigger Dispatch
//!
//! Maps inbound message content to handler functions: by author tag, by
//! first word, or by substring.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod dispatcher;
pub mod handler;
pub mod registry;

pub use dispatcher::Dispatcher;
pub use handler::{TriggerHandler, TriggerKind};
pub use registry::TriggerRegistry;
