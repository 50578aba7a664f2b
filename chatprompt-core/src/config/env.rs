//! Environment variable interpolation for configuration

use super::error::ConfigError;
use regex::{Captures, Regex};
use std::env;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is a valid regex")
});

/// Replace every `${VAR}` in `content` with the variable's value.
/// Fails on the first variable that is not set.
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut missing: Option<String> = None;

    let result = ENV_VAR_PATTERN.replace_all(content, |cap: &Captures<'_>| {
        match env::var(&cap[1]) {
            Ok(value) => value,
            Err(_) => {
                missing.get_or_insert_with(|| cap[1].to_string());
                String::new()
            }
        }
    });

    if let Some(var) = missing {
        return Err(ConfigError::EnvVarNotFound { var });
    }

    Ok(result.into_owned())
}
