//! Requester identity
//!
//! A [`Prompt`](crate::prompt::Prompt) records who asked. The identity is
//! metadata only: it is never validated and never enters the message array,
//! apart from the optional `user` field of the request body.

use std::env;
use std::process::Command;
use tracing::debug;

/// Source of the requester's name and email
pub trait IdentityProvider: Send + Sync {
    fn user_name(&self) -> String;

    fn user_email(&self) -> String;
}

/// Fixed identity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StaticIdentity {
    name: String,
    email: String,
}

impl StaticIdentity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn user_name(&self) -> String {
        self.name.clone()
    }

    fn user_email(&self) -> String {
        self.email.clone()
    }
}

/// Identity read from `git config`.
///
/// Falls back to the `USER` (or `USERNAME`) environment variable for the name
/// and to an empty email when git is missing or has no value configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitIdentity {
    git: String,
}

impl Default for GitIdentity {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitIdentity {
    /// Use the given git executable
    pub fn new(git: impl Into<String>) -> Self {
        Self { git: git.into() }
    }

    fn config_value(&self, key: &str) -> Option<String> {
        let output = match Command::new(&self.git)
            .args(["config", "--get", key])
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                debug!("Could not run '{}' to read {}: {}", self.git, key, e);
                return None;
            }
        };

        if !output.status.success() {
            debug!("git has no value for {}", key);
            return None;
        }

        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Some(value).filter(|v| !v.is_empty())
    }
}

impl IdentityProvider for GitIdentity {
    fn user_name(&self) -> String {
        self.config_value("user.name")
            .or_else(|| env::var("USER").ok())
            .or_else(|| env::var("USERNAME").ok())
            .unwrap_or_default()
    }

    fn user_email(&self) -> String {
        self.config_value("user.email").unwrap_or_default()
    }
}
