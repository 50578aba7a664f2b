//! Validated chat message types
//!
//! A [`Message`] is valid by construction: every constructor and the serde
//! `Deserialize` path run the same checks, so an instance that exists has a
//! known role, non-blank content and, if present, a well-formed name.

use crate::error::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("name pattern is a valid regex"));

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions that guide the model's behavior
    System,
    /// User input message
    User,
    /// Assistant (model) response
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(ValidationError::invalid_value(
                "message.role",
                "one of system, user, assistant",
                other,
            )),
        }
    }
}

/// Unvalidated message fields, as handed over by callers or decoded from payloads
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawMessage {
    pub role: String,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub name: Option<String>,
}

/// A validated chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMessage")]
pub struct Message {
    role: MessageRole,

    content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl Message {
    /// Create a message without a sender name
    pub fn new(role: MessageRole, content: impl Into<String>) -> Result<Self, ValidationError> {
        let content = content.into();
        validate_content(&content)?;
        Ok(Self {
            role,
            content,
            name: None,
        })
    }

    /// Create a message carrying a sender name
    pub fn with_name(
        role: MessageRole,
        content: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_name(&name)?;
        let mut message = Self::new(role, content)?;
        message.name = Some(name);
        Ok(message)
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// JSON object form: `role` and `content`, plus `name` only when set
    pub fn to_value(&self) -> Value {
        let mut value = json!({
            "role": self.role.as_str(),
            "content": self.content,
        });
        if let Some(name) = &self.name {
            value["name"] = Value::String(name.clone());
        }
        value
    }

    /// Copy of this message with `tag` prepended to the content
    pub(crate) fn tagged(&self, tag: &str) -> Self {
        Self {
            role: self.role,
            content: format!("{}{}", tag, self.content),
            name: self.name.clone(),
        }
    }

    /// Empty message used as the accumulator for a streamed choice.
    /// Skips content validation: the content fills in as fragments arrive.
    pub(crate) fn pending(role: MessageRole) -> Self {
        Self {
            role,
            content: String::new(),
            name: None,
        }
    }

    pub(crate) fn set_role(&mut self, role: MessageRole) {
        self.role = role;
    }

    pub(crate) fn push_content(&mut self, fragment: &str) {
        self.content.push_str(fragment);
    }
}

impl TryFrom<RawMessage> for Message {
    type Error = ValidationError;

    fn try_from(raw: RawMessage) -> Result<Self, Self::Error> {
        let role: MessageRole = raw.role.parse()?;
        let content = raw
            .content
            .ok_or_else(|| ValidationError::required("message.content"))?;
        match raw.name {
            Some(name) => Message::with_name(role, content, name),
            None => Message::new(role, content),
        }
    }
}

fn validate_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::required("message.content")
            .with_context("content must contain non-whitespace characters"));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::required("message.name")
            .with_context("name must not be blank when provided"));
    }
    if !NAME_PATTERN.is_match(name) {
        return Err(ValidationError::invalid_format(
            "message.name",
            format!(
                "'{}' may only contain letters, digits, underscores and hyphens",
                name
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [MessageRole::System, MessageRole::User, MessageRole::Assistant] {
            assert_eq!(role.as_str().parse::<MessageRole>().unwrap(), role);
        }
        assert!("tool".parse::<MessageRole>().is_err());
        assert!("User".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_tagged_keeps_role_and_name() {
        let msg = Message::with_name(MessageRole::User, "Question", "alice").unwrap();
        let tagged = msg.tagged("<request>");
        assert_eq!(tagged.content(), "<request>Question");
        assert_eq!(tagged.role(), MessageRole::User);
        assert_eq!(tagged.name(), Some("alice"));
    }

    #[test]
    fn test_pending_accumulates() {
        let mut msg = Message::pending(MessageRole::Assistant);
        assert_eq!(msg.content(), "");
        msg.push_content("Tomo");
        msg.push_content("rrow.");
        msg.set_role(MessageRole::System);
        assert_eq!(msg.content(), "Tomorrow.");
        assert_eq!(msg.role(), MessageRole::System);
    }

    #[test]
    fn test_deserialize_rejects_null_content() {
        let err = serde_json::from_str::<Message>(r#"{"role":"user","content":null}"#);
        assert!(err.is_err());
    }
}
