//! Chat-completion payload types
//!
//! These types match the chat-completion API format on both directions of
//! the wire. Inbound types tolerate fields they do not use (`id`, `object`,
//! `system_fingerprint`, `logprobs`), and keep roles as plain strings so that
//! role validation reports a [`ValidationError`](crate::error::ValidationError)
//! rather than a decode failure.

use crate::message::{Message, RawMessage};
use serde::{Deserialize, Serialize};

/// Outbound request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequestBody {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// Complete (non-streamed) chat completion response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub id: Option<String>,
    pub created: i64,
    pub model: String,
    pub usage: Usage,
    pub choices: Vec<Choice>,
}

/// One choice of a complete response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Choice {
    pub index: usize,
    pub message: RawMessage,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,

    #[serde(default)]
    pub total_tokens: u32,
}

/// One streamed fragment
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub id: Option<String>,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChunkChoice>,

    /// Only present on the final chunk when usage reporting was requested
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Partial update for one choice index
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChunkChoice {
    pub index: usize,

    #[serde(default)]
    pub delta: Delta,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Delta carried by a streamed choice; either field may be absent
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub content: Option<String>,
}
