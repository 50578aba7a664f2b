//! Prompt assembly and response bookkeeping
//!
//! A [`Prompt`] collects the messages for one chat turn, renders them into
//! the outbound message array, and reconstructs the API's answer from either
//! a complete response or a sequence of streamed fragments.
//!
//! Outbound order is fixed:
//! 1. instruct messages, verbatim
//! 2. the request message, prefixed with `<request>`
//! 3. context messages, prefixed with `<context>`
//! 4. record messages, verbatim

pub mod assembler;
pub mod wire;

pub use assembler::ResponseAssembler;
pub use wire::{
    ChatCompletion, ChatCompletionChunk, ChatRequestBody, Choice, ChunkChoice, Delta, Usage,
};

use crate::config::{ModelMatch, PromptConfig};
use crate::error::{PromptError, PromptResult, ValidationError};
use crate::message::{Message, MessageRole, MessageType, TypedMessage};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// Prefix applied to the request message's content
pub const REQUEST_TAG: &str = "<request>";

/// Prefix applied to every context message's content
pub const CONTEXT_TAG: &str = "<context>";

/// Aggregate request/response state for one chat turn
#[derive(Debug, Clone)]
pub struct Prompt {
    id: Uuid,
    model: String,
    model_match: ModelMatch,
    user_name: String,
    user_email: String,

    instructs: Vec<TypedMessage>,
    contexts: Vec<TypedMessage>,
    records: Vec<TypedMessage>,
    request: Option<TypedMessage>,

    timestamp: Option<i64>,
    request_tokens: Option<u32>,
    response_tokens: Option<u32>,
    responses: ResponseAssembler,
}

impl Prompt {
    pub fn new(
        model: impl Into<String>,
        user_name: impl Into<String>,
        user_email: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            model: model.into(),
            model_match: ModelMatch::default(),
            user_name: user_name.into(),
            user_email: user_email.into(),
            instructs: Vec::new(),
            contexts: Vec::new(),
            records: Vec::new(),
            request: None,
            timestamp: None,
            request_tokens: None,
            response_tokens: None,
            responses: ResponseAssembler::new(),
        }
    }

    /// Create a prompt from configuration, resolving the requester identity
    pub fn from_config(config: &PromptConfig) -> Self {
        let identity = config.identity();
        Self::new(
            config.model.clone(),
            identity.user_name(),
            identity.user_email(),
        )
        .with_model_match(config.model_match)
    }

    /// Set how a response's reported model is compared to [`model`](Self::model)
    pub fn with_model_match(mut self, model_match: ModelMatch) -> Self {
        self.model_match = model_match;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn model_match(&self) -> ModelMatch {
        self.model_match
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn user_email(&self) -> &str {
        &self.user_email
    }

    pub fn instructs(&self) -> &[TypedMessage] {
        &self.instructs
    }

    pub fn contexts(&self) -> &[TypedMessage] {
        &self.contexts
    }

    pub fn records(&self) -> &[TypedMessage] {
        &self.records
    }

    pub fn request(&self) -> Option<&TypedMessage> {
        self.request.as_ref()
    }

    /// Creation time reported by the last applied response, in unix seconds
    pub fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }

    pub fn request_tokens(&self) -> Option<u32> {
        self.request_tokens
    }

    pub fn response_tokens(&self) -> Option<u32> {
        self.response_tokens
    }

    /// Route a message into the collection named by its tag
    pub fn append_message(&mut self, message: TypedMessage) -> Result<(), ValidationError> {
        let message_type = message.message_type()?;
        debug!("Appending {} message to prompt {}", message_type, self.id);
        match message_type {
            MessageType::Instruct => self.instructs.push(message),
            MessageType::Context => self.contexts.push(message),
            MessageType::Record => self.records.push(message),
        }
        Ok(())
    }

    /// Set the live request, replacing any previous one.
    ///
    /// The message's tag must still parse, but which category it names does
    /// not matter. Messages with the `user` role are rejected.
    pub fn set_request(&mut self, message: TypedMessage) -> Result<(), ValidationError> {
        message.message_type()?;
        if message.role() == MessageRole::User {
            return Err(ValidationError::incompatible(
                "request.role",
                "the request message cannot use the user role",
            ));
        }
        debug!("Setting request message on prompt {}", self.id);
        self.request = Some(message);
        Ok(())
    }

    /// The outbound message array, in wire order
    pub fn messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(
            self.instructs.len()
                + usize::from(self.request.is_some())
                + self.contexts.len()
                + self.records.len(),
        );
        messages.extend(self.instructs.iter().map(|m| m.message().clone()));
        if let Some(request) = &self.request {
            messages.push(request.tagged(REQUEST_TAG));
        }
        messages.extend(self.contexts.iter().map(|m| m.tagged(CONTEXT_TAG)));
        messages.extend(self.records.iter().map(|m| m.message().clone()));
        messages
    }

    /// [`messages`](Self::messages) as JSON objects
    pub fn messages_json(&self) -> Vec<Value> {
        self.messages().iter().map(Message::to_value).collect()
    }

    /// Request body for the transport layer to post
    pub fn request_body(&self, stream: bool) -> ChatRequestBody {
        ChatRequestBody {
            model: self.model.clone(),
            messages: self.messages(),
            stream,
            user: Some(self.user_email.clone()).filter(|email| !email.is_empty()),
        }
    }

    /// Assembled response messages, keyed and ordered by choice index
    pub fn responses(&self) -> &BTreeMap<usize, TypedMessage> {
        self.responses.messages()
    }

    pub fn response(&self, index: usize) -> Option<&TypedMessage> {
        self.responses.messages().get(&index)
    }

    pub fn finish_reason(&self, index: usize) -> Option<&str> {
        self.responses.finish_reason(index)
    }

    /// True once every received choice has reported a finish reason
    pub fn is_complete(&self) -> bool {
        self.responses.is_complete()
    }

    /// Decode a complete response and apply it with [`apply_response`](Self::apply_response)
    pub fn set_response(&mut self, payload: &str) -> PromptResult<()> {
        let response: ChatCompletion =
            serde_json::from_str(payload).map_err(|e| PromptError::parse("response", e))?;
        self.apply_response(response)?;
        Ok(())
    }

    /// Replace all response state with a complete response.
    /// On failure the previous response state is kept.
    pub fn apply_response(&mut self, response: ChatCompletion) -> Result<(), ValidationError> {
        self.check_model(&response.model)?;
        self.responses.replace(response.choices)?;
        self.timestamp = Some(response.created);
        self.request_tokens = Some(response.usage.prompt_tokens);
        self.response_tokens = Some(response.usage.completion_tokens);
        debug!(
            "Applied response from '{}' to prompt {} ({} choices, {}+{} tokens)",
            response.model,
            self.id,
            self.responses.len(),
            response.usage.prompt_tokens,
            response.usage.completion_tokens
        );
        Ok(())
    }

    /// Decode one streamed fragment and apply it with [`apply_chunk`](Self::apply_chunk)
    pub fn append_response(&mut self, fragment: &str) -> PromptResult<()> {
        let chunk: ChatCompletionChunk =
            serde_json::from_str(fragment).map_err(|e| PromptError::parse("stream chunk", e))?;
        self.apply_chunk(chunk)?;
        Ok(())
    }

    /// Merge one streamed fragment into the response state.
    /// On failure the previous response state is kept.
    pub fn apply_chunk(&mut self, chunk: ChatCompletionChunk) -> Result<(), ValidationError> {
        self.check_model(&chunk.model)?;
        self.responses.apply(&chunk.choices)?;
        self.timestamp = Some(chunk.created);
        if let Some(usage) = chunk.usage {
            self.request_tokens = Some(usage.prompt_tokens);
            self.response_tokens = Some(usage.completion_tokens);
            debug!(
                "Stream for prompt {} reported {}+{} tokens",
                self.id, usage.prompt_tokens, usage.completion_tokens
            );
        }
        Ok(())
    }

    fn check_model(&self, reported: &str) -> Result<(), ValidationError> {
        if self.model_match.accepts(&self.model, reported) {
            return Ok(());
        }
        warn!(
            "Rejecting response from model '{}' for prompt {} (configured '{}')",
            reported, self.id, self.model
        );
        Err(ValidationError::invalid_value(
            "response.model",
            self.model_match.expectation(&self.model),
            reported,
        ))
    }
}
