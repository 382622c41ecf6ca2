//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the base URL is an absolute http(s) URL
//! - Validate value ranges (timeouts > 0)
//! - Check the selected storage backend has what it needs
//!
//! Returns all validation errors, not just the first.

use thiserror::Error;
use url::Url;

use crate::config::schema::{ClientConfig, StorageBackend};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("api.base_url '{value}' is not a valid URL: {reason}")]
    InvalidBaseUrl { value: String, reason: String },

    #[error("api.base_url must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("language.fallback must not be empty")]
    EmptyFallbackLanguage,

    #[error("storage.path is required for the file backend")]
    MissingStoragePath,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.api.base_url) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
            }
        }
        Err(e) => errors.push(ValidationError::InvalidBaseUrl {
            value: config.api.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if config.language.fallback.trim().is_empty() {
        errors.push(ValidationError::EmptyFallbackLanguage);
    }

    if config.storage.backend == StorageBackend::File
        && config.storage.path.as_deref().map_or(true, |p| p.trim().is_empty())
    {
        errors.push(ValidationError::MissingStoragePath);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
