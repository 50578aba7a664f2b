//! Chat message data model
//!
//! Two layers:
//! - [`Message`]: role, content and optional name, validated on construction
//! - [`TypedMessage`]: a message tagged with the prompt category it belongs to

pub mod typed;
pub mod types;

pub use typed::{MessageType, TypedMessage};
pub use types::{Message, MessageRole, RawMessage};
