//! Reconstruction of response messages from complete and streamed payloads

use super::wire::{Choice, ChunkChoice};
use crate::error::ValidationError;
use crate::message::{Message, MessageRole, MessageType, TypedMessage};
use std::collections::BTreeMap;
use tracing::trace;

/// Response messages keyed by choice index.
///
/// Complete responses replace the whole ledger; streamed fragments update it
/// one index at a time. Fragments for different indices may interleave, but
/// fragments for the same index must arrive in the order they were produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseAssembler {
    messages: BTreeMap<usize, TypedMessage>,
    finish_reasons: BTreeMap<usize, String>,
}

impl ResponseAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembled messages in ascending index order
    pub fn messages(&self) -> &BTreeMap<usize, TypedMessage> {
        &self.messages
    }

    pub fn finish_reason(&self, index: usize) -> Option<&str> {
        self.finish_reasons.get(&index).map(String::as_str)
    }

    /// True once every known choice has reported a finish reason
    pub fn is_complete(&self) -> bool {
        !self.messages.is_empty()
            && self
                .messages
                .keys()
                .all(|index| self.finish_reasons.contains_key(index))
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.finish_reasons.clear();
    }

    /// Replace all state with the choices of a complete response.
    /// Nothing changes if any choice fails validation.
    pub fn replace(&mut self, choices: Vec<Choice>) -> Result<(), ValidationError> {
        let mut messages = BTreeMap::new();
        let mut finish_reasons = BTreeMap::new();

        for choice in choices {
            let index = choice.index;
            let message = Message::try_from(choice.message)
                .map_err(|err| at(format!("choices[{}].{}", index, err.field_path), err))?;
            messages.insert(
                index,
                TypedMessage::from_message(MessageType::Context, message),
            );
            if let Some(reason) = choice.finish_reason {
                finish_reasons.insert(index, reason);
            }
        }

        self.messages = messages;
        self.finish_reasons = finish_reasons;
        Ok(())
    }

    /// Merge one fragment's choices into the ledger.
    /// Nothing changes if any delta carries an unknown role.
    pub fn apply(&mut self, choices: &[ChunkChoice]) -> Result<(), ValidationError> {
        let roles = choices
            .iter()
            .map(|choice| {
                choice
                    .delta
                    .role
                    .as_deref()
                    .map(str::parse::<MessageRole>)
                    .transpose()
                    .map_err(|err| at(format!("choices[{}].delta.role", choice.index), err))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (choice, role) in choices.iter().zip(roles) {
            let entry = self.messages.entry(choice.index).or_insert_with(|| {
                TypedMessage::from_message(
                    MessageType::Context,
                    Message::pending(role.unwrap_or(MessageRole::Assistant)),
                )
            });
            if let Some(role) = role {
                entry.message_mut().set_role(role);
            }
            if let Some(content) = &choice.delta.content {
                entry.message_mut().push_content(content);
            }
            if let Some(reason) = &choice.finish_reason {
                self.finish_reasons.insert(choice.index, reason.clone());
            }
            trace!(
                "Applied delta to choice {} (now {} bytes)",
                choice.index,
                entry.content().len()
            );
        }

        Ok(())
    }
}

fn at(field_path: String, err: ValidationError) -> ValidationError {
    ValidationError { field_path, ..err }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::RawMessage;
    use crate::prompt::wire::Delta;

    fn chunk(index: usize, role: Option<&str>, content: Option<&str>) -> ChunkChoice {
        ChunkChoice {
            index,
            delta: Delta {
                role: role.map(String::from),
                content: content.map(String::from),
            },
            finish_reason: None,
        }
    }

    #[test]
    fn test_interleaved_indices_accumulate_independently() {
        let mut assembler = ResponseAssembler::new();
        assembler.apply(&[chunk(0, Some("assistant"), None)]).unwrap();
        assembler.apply(&[chunk(1, Some("assistant"), Some("Tom"))]).unwrap();
        assembler.apply(&[chunk(0, None, Some("Tom"))]).unwrap();
        assembler.apply(&[chunk(1, None, Some("orrow!"))]).unwrap();
        assembler.apply(&[chunk(0, None, Some("orrow."))]).unwrap();

        assert_eq!(assembler.len(), 2);
        assert_eq!(assembler.messages()[&0].content(), "Tomorrow.");
        assert_eq!(assembler.messages()[&1].content(), "Tomorrow!");
        assert!(!assembler.is_complete());
    }

    #[test]
    fn test_role_defaults_until_supplied() {
        let mut assembler = ResponseAssembler::new();
        assembler.apply(&[chunk(0, None, Some("Hi"))]).unwrap();
        assert_eq!(assembler.messages()[&0].role(), MessageRole::Assistant);

        assembler.apply(&[chunk(0, Some("system"), None)]).unwrap();
        assert_eq!(assembler.messages()[&0].role(), MessageRole::System);
        assert_eq!(assembler.messages()[&0].content(), "Hi");
    }

    #[test]
    fn test_unknown_role_leaves_state_untouched() {
        let mut assembler = ResponseAssembler::new();
        assembler.apply(&[chunk(0, Some("assistant"), Some("A"))]).unwrap();
        let before = assembler.clone();

        let err = assembler
            .apply(&[chunk(0, None, Some("B")), chunk(1, Some("robot"), Some("C"))])
            .unwrap_err();
        assert_eq!(err.field_path, "choices[1].delta.role");
        assert_eq!(assembler, before);
    }

    #[test]
    fn test_replace_discards_previous_state() {
        let mut assembler = ResponseAssembler::new();
        assembler.apply(&[chunk(3, Some("assistant"), Some("old"))]).unwrap();

        assembler
            .replace(vec![Choice {
                index: 0,
                message: RawMessage {
                    role: "assistant".to_string(),
                    content: Some("new".to_string()),
                    name: None,
                },
                finish_reason: Some("stop".to_string()),
            }])
            .unwrap();

        assert_eq!(assembler.len(), 1);
        assert_eq!(assembler.messages()[&0].content(), "new");
        assert_eq!(
            assembler.messages()[&0].message_type().unwrap(),
            MessageType::Context
        );
        assert_eq!(assembler.finish_reason(0), Some("stop"));
        assert!(assembler.is_complete());
    }

    #[test]
    fn test_replace_reports_choice_path() {
        let mut assembler = ResponseAssembler::new();
        let err = assembler
            .replace(vec![Choice {
                index: 2,
                message: RawMessage {
                    role: "assistant".to_string(),
                    content: None,
                    name: None,
                },
                finish_reason: None,
            }])
            .unwrap_err();
        assert_eq!(err.field_path, "choices[2].message.content");
        assert!(assembler.is_empty());
    }
}
