//! Chatprompt Core Library
//!
//! This crate assembles the message array sent to a chat-completion API and
//! rebuilds the API's answer, complete or streamed, into response messages.
//!
//! Transport is left to the caller: it reads [`Prompt::messages`] (or
//! [`Prompt::request_body`]) to build the request, and feeds raw payloads
//! back through [`Prompt::set_response`] or [`Prompt::append_response`].

pub mod config;
pub mod error;
pub mod identity;
pub mod message;
pub mod prompt;

pub use config::{ModelMatch, PromptConfig};
pub use error::{PromptError, PromptResult, ValidationError, ValidationErrorKind};
pub use identity::{GitIdentity, IdentityProvider, StaticIdentity};
pub use message::{Message, MessageRole, MessageType, RawMessage, TypedMessage};
pub use prompt::{Prompt, CONTEXT_TAG, REQUEST_TAG};

/// Returns the version of the Chatprompt Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
