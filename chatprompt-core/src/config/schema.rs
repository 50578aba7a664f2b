//! Configuration schema for prompt construction

use crate::error::ValidationError;
use crate::identity::{GitIdentity, IdentityProvider, StaticIdentity};
use serde::{Deserialize, Serialize};

/// Configuration schema version understood by this crate
pub const SUPPORTED_VERSION: &str = "0.1";

/// Root configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Configuration schema version
    pub version: String,

    /// Model identifier requests are made for
    pub model: String,

    /// Requester identity; resolved from git when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserConfig>,

    /// How a response's reported model is matched against `model`
    #[serde(default)]
    pub model_match: ModelMatch,
}

/// Requester identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    pub name: String,

    #[serde(default)]
    pub email: String,
}

/// Rule for accepting a response's reported model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelMatch {
    /// Reported model starts with the configured one (`gpt-3.5-turbo` accepts `gpt-3.5-turbo-0301`)
    #[default]
    Prefix,
    /// Reported model equals the configured one
    Exact,
}

impl ModelMatch {
    pub fn accepts(&self, configured: &str, reported: &str) -> bool {
        match self {
            ModelMatch::Prefix => reported.starts_with(configured),
            ModelMatch::Exact => reported == configured,
        }
    }

    /// Human-readable description of what `accepts` requires
    pub fn expectation(&self, configured: &str) -> String {
        match self {
            ModelMatch::Prefix => format!("a model starting with '{}'", configured),
            ModelMatch::Exact => format!("model '{}'", configured),
        }
    }
}

impl PromptConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            version: SUPPORTED_VERSION.to_string(),
            model: model.into(),
            user: None,
            model_match: ModelMatch::default(),
        }
    }

    pub fn with_user(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.user = Some(UserConfig {
            name: name.into(),
            email: email.into(),
        });
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.version.is_empty() {
            return Err(ValidationError::required("version"));
        }

        if self.version != SUPPORTED_VERSION {
            return Err(ValidationError::invalid_value(
                "version",
                SUPPORTED_VERSION,
                self.version.clone(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(ValidationError::required("model"));
        }

        if let Some(user) = &self.user {
            if user.name.trim().is_empty() {
                return Err(ValidationError::required("user.name"));
            }
            if !user.email.is_empty() && !user.email.contains('@') {
                return Err(ValidationError::invalid_format(
                    "user.email",
                    format!("'{}' is not an email address", user.email),
                ));
            }
        }

        Ok(())
    }

    /// Identity provider for this configuration
    pub fn identity(&self) -> Box<dyn IdentityProvider> {
        match &self.user {
            Some(user) => Box::new(StaticIdentity::new(user.name.clone(), user.email.clone())),
            None => Box::new(GitIdentity::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_match() {
        assert!(ModelMatch::Prefix.accepts("gpt-3.5-turbo", "gpt-3.5-turbo-0301"));
        assert!(ModelMatch::Prefix.accepts("gpt-3.5-turbo", "gpt-3.5-turbo"));
        assert!(!ModelMatch::Prefix.accepts("gpt-3.5-turbo", "gpt-4"));
    }

    #[test]
    fn test_exact_match() {
        assert!(ModelMatch::Exact.accepts("gpt-4", "gpt-4"));
        assert!(!ModelMatch::Exact.accepts("gpt-4", "gpt-4-0613"));
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let config = PromptConfig::new("gpt-4").with_user("Jane", "jane.example.com");
        let err = config.validate().unwrap_err();
        assert_eq!(err.field_path, "user.email");
    }

    #[test]
    fn test_validate_rejects_unknown_version() {
        let mut config = PromptConfig::new("gpt-4");
        config.version = "2.0".to_string();
        assert_eq!(config.validate().unwrap_err().field_path, "version");
    }

    #[test]
    fn test_configured_user_wins() {
        let config = PromptConfig::new("gpt-4").with_user("Jane", "jane@example.com");
        let identity = config.identity();
        assert_eq!(identity.user_name(), "Jane");
        assert_eq!(identity.user_email(), "jane@example.com");
    }
}
