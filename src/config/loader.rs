//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `api.base_url`.
pub const BASE_URL_ENV: &str = "DOCTOR_CRM_API_BASE_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
///
/// Emits no log events: configuration is loaded before the subscriber that
/// it configures is installed.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content, std::env::var(BASE_URL_ENV).ok())
}

/// Load the configuration file if it exists, otherwise validate the defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => parse_config("", std::env::var(BASE_URL_ENV).ok()),
    }
}

/// Parse TOML content, apply the base URL override and validate.
pub fn parse_config(content: &str, base_url_override: Option<String>) -> Result<ClientConfig, ConfigError> {
    let mut config: ClientConfig = toml::from_str(content)?;

    if let Some(base_url) = base_url_override.filter(|v| !v.trim().is_empty()) {
        config.api.base_url = base_url;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
