//! Error types for message validation and response parsing

use std::fmt;
use thiserror::Error;

/// Result type for prompt operations
pub type PromptResult<T> = Result<T, PromptError>;

/// Errors surfaced by [`Prompt`](crate::prompt::Prompt) operations
#[derive(Debug, Error)]
pub enum PromptError {
    /// Input was rejected by a validation rule
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A payload could not be decoded
    #[error("Failed to parse {payload}: {message}")]
    Parse {
        /// Which payload was being decoded (e.g. "response", "stream chunk")
        payload: &'static str,
        message: String,
    },
}

impl PromptError {
    /// Wrap a JSON decoding failure for the named payload
    pub fn parse(payload: &'static str, err: serde_json::Error) -> Self {
        PromptError::Parse {
            payload,
            message: err.to_string(),
        }
    }

    /// The validation error, if this is one
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            PromptError::Validation(err) => Some(err),
            PromptError::Parse { .. } => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, PromptError::Validation(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, PromptError::Parse { .. })
    }
}

/// Validation error with field path for precise error reporting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    /// Path to the field that failed validation (e.g., "message.name")
    pub field_path: String,
    /// The validation error kind
    pub kind: ValidationErrorKind,
    /// Optional additional context
    pub context: Option<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed at '{}': {}", self.field_path, self.kind)?;
        if let Some(ctx) = &self.context {
            write!(f, " ({})", ctx)?;
        }
        Ok(())
    }
}

/// Specific validation error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationErrorKind {
    #[error("required field is missing")]
    RequiredFieldMissing,

    #[error("invalid value: expected {expected}, got {actual}")]
    InvalidValue { expected: String, actual: String },

    #[error("invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("incompatible value: {message}")]
    Incompatible { message: String },
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(field_path: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            field_path: field_path.into(),
            kind,
            context: None,
        }
    }

    /// Add context to the validation error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Helper to create a required field error
    pub fn required(field_path: impl Into<String>) -> Self {
        Self::new(field_path, ValidationErrorKind::RequiredFieldMissing)
    }

    /// Helper to create an invalid value error
    pub fn invalid_value(
        field_path: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::new(
            field_path,
            ValidationErrorKind::InvalidValue {
                expected: expected.into(),
                actual: actual.into(),
            },
        )
    }

    /// Helper to create an invalid format error
    pub fn invalid_format(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            field_path,
            ValidationErrorKind::InvalidFormat {
                message: message.into(),
            },
        )
    }

    /// Helper to create an incompatible value error
    pub fn incompatible(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            field_path,
            ValidationErrorKind::Incompatible {
                message: message.into(),
            },
        )
    }
}
