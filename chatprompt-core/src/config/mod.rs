//! Configuration module
//!
//! Loads a [`PromptConfig`] from YAML or JSON, interpolating `${VAR}`
//! placeholders from the environment before parsing.

mod env;
mod error;
mod schema;

pub use env::interpolate_env_vars;
pub use error::{ConfigError, ConfigResult};
pub use schema::{ModelMatch, PromptConfig, UserConfig, SUPPORTED_VERSION};

use std::fs;
use std::path::Path;
use tracing::debug;

/// Load a configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> ConfigResult<PromptConfig> {
    let path = path.as_ref();
    let content = read(path)?;
    parse_yaml(&content, &path.to_string_lossy())
}

/// Load a configuration from a JSON file
pub fn load_from_json<P: AsRef<Path>>(path: P) -> ConfigResult<PromptConfig> {
    let path = path.as_ref();
    let content = read(path)?;
    parse_json(&content, &path.to_string_lossy())
}

/// Parse a configuration from YAML text
pub fn from_yaml_str(content: &str) -> ConfigResult<PromptConfig> {
    parse_yaml(content, "<string>")
}

/// Parse a configuration from JSON text
pub fn from_json_str(content: &str) -> ConfigResult<PromptConfig> {
    parse_json(content, "<string>")
}

fn read(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

fn parse_yaml(content: &str, origin: &str) -> ConfigResult<PromptConfig> {
    let interpolated = interpolate_env_vars(content)?;

    let config: PromptConfig =
        serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            line: e.location().map(|l| l.line()),
            column: e.location().map(|l| l.column()),
            message: e.to_string(),
        })?;

    config.validate()?;
    debug!("Loaded prompt config for model '{}' from {}", config.model, origin);
    Ok(config)
}

fn parse_json(content: &str, origin: &str) -> ConfigResult<PromptConfig> {
    let interpolated = interpolate_env_vars(content)?;

    let config: PromptConfig =
        serde_json::from_str(&interpolated).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            line: Some(e.line()),
            column: Some(e.column()),
            message: e.to_string(),
        })?;

    config.validate()?;
    debug!("Loaded prompt config for model '{}' from {}", config.model, origin);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "0.1"
model: gpt-3.5-turbo
user:
  name: John Doe
  email: john.doe@example.com
model_match: exact
"#;
        let config = from_yaml_str(yaml).unwrap();
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.model_match, ModelMatch::Exact);
        assert_eq!(config.user.unwrap().name, "John Doe");
    }

    #[test]
    fn test_model_match_defaults_to_prefix() {
        let config = from_json_str(r#"{"version": "0.1", "model": "gpt-4"}"#).unwrap();
        assert_eq!(config.model_match, ModelMatch::Prefix);
        assert!(config.user.is_none());
    }
}
