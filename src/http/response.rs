//! Response representation.
//!
//! # Responsibilities
//! - Hold the status, headers and parsed body of a settled request
//! - Parse bodies leniently: empty → `null`, non-JSON → JSON string
//! - Decode into typed values on demand

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http::error::ApiError;

/// A response as seen by callers of the client.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub data: Value,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, data: Value) -> Self {
        Self {
            status,
            headers,
            data,
        }
    }

    /// Build a response from raw body bytes.
    pub fn from_bytes(status: StatusCode, headers: HeaderMap, body: &[u8]) -> Self {
        Self::new(status, headers, parse_body(body))
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(self.data.clone()).map_err(|e| {
            let snippet: String = self.data.to_string().chars().take(256).collect();
            ApiError::Decode(format!("{e} (status {}) body: {snippet}", self.status))
        })
    }

    /// Consume the response and decode the body into `T`.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let status = self.status;
        serde_json::from_value(self.data)
            .map_err(|e| ApiError::Decode(format!("{e} (status {status})")))
    }
}

/// Parse a response body the way callers expect to see it.
pub fn parse_body(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
