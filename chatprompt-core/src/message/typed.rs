//! Messages tagged with the prompt category they belong to

use super::types::{Message, MessageRole};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// Category that decides where a message lands in the assembled prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// System framing, sent first
    Instruct,
    /// Background material, sent with a `<context>` tag
    Context,
    /// Prior turn history, sent verbatim
    Record,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Instruct => "instruct",
            MessageType::Context => "context",
            MessageType::Record => "record",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instruct" => Ok(MessageType::Instruct),
            "context" => Ok(MessageType::Context),
            "record" => Ok(MessageType::Record),
            other => Err(ValidationError::invalid_value(
                "message_type",
                "one of instruct, context, record",
                other,
            )),
        }
    }
}

/// A [`Message`] plus its category tag.
///
/// The tag is stored as written and can be replaced at any time with
/// [`set_tag`](Self::set_tag). It is parsed by [`message_type`](Self::message_type)
/// whenever a prompt consumes the message, so a tag that was changed to an
/// unknown value after construction is rejected at that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedMessage {
    message: Message,
    tag: String,
}

impl TypedMessage {
    pub fn new(
        message_type: MessageType,
        role: MessageRole,
        content: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self::from_message(message_type, Message::new(role, content)?))
    }

    pub fn with_name(
        message_type: MessageType,
        role: MessageRole,
        content: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self::from_message(
            message_type,
            Message::with_name(role, content, name)?,
        ))
    }

    pub fn from_message(message_type: MessageType, message: Message) -> Self {
        Self {
            message,
            tag: message_type.as_str().to_string(),
        }
    }

    /// Parse the current tag
    pub fn message_type(&self) -> Result<MessageType, ValidationError> {
        self.tag.parse()
    }

    /// The raw tag as currently stored
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_message_type(&mut self, message_type: MessageType) {
        self.tag = message_type.as_str().to_string();
    }

    /// Overwrite the tag without checking it
    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn into_message(self) -> Message {
        self.message
    }

    pub(crate) fn message_mut(&mut self) -> &mut Message {
        &mut self.message
    }
}

impl Deref for TypedMessage {
    type Target = Message;

    fn deref(&self) -> &Self::Target {
        &self.message
    }
}
