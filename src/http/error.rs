//! Client error types.
//!
//! Every error is `Clone`: one refresh failure is handed to every caller
//! queued behind it.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::api::models::Role;

/// Category of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Other,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Other => "other",
        }
    }
}

/// The request never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} error: {message}", .kind.as_str())]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            TransportErrorKind::Timeout
        } else if e.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, e.to_string())
    }
}

/// Structured error surfaced to every caller of the client.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Server answered with a non-2xx status.
    #[error("Request failed with status {status}: {message}")]
    Status {
        status: StatusCode,
        data: Value,
        message: String,
    },

    /// Network unreachable, timeout, or similar.
    #[error("Request failed: {0}")]
    Transport(#[from] TransportError),

    /// The token refresh call failed; the session is over.
    #[error("Session refresh failed: {0}")]
    RefreshFailed(Box<ApiError>),

    /// The caller leading the refresh went away before it settled.
    #[error("Session refresh was abandoned before completing")]
    RefreshAborted,

    /// Response body did not have the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// Signed in, but with the wrong role.
    #[error("Forbidden: requires role {required}")]
    Forbidden { required: Role },

    /// No signed-in user.
    #[error("Not signed in")]
    NotAuthenticated,

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ApiError {
    /// Build an error from a non-2xx response.
    pub fn from_status(status: StatusCode, data: Value) -> Self {
        let message = detail_of(&data).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown status")
                .to_string()
        });
        Self::Status {
            status,
            data,
            message,
        }
    }

    /// Response status, if the server answered. Refresh failures report the
    /// refresh call's status.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::RefreshFailed(inner) => inner.status(),
            _ => None,
        }
    }

    /// Parsed response body, if the server answered.
    pub fn data(&self) -> Option<&Value> {
        match self {
            ApiError::Status { data, .. } => Some(data),
            ApiError::RefreshFailed(inner) => inner.data(),
            _ => None,
        }
    }

    /// The `detail` message of an error body, if present.
    pub fn detail(&self) -> Option<String> {
        self.data().and_then(detail_of)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// True when the stored session was discarded and the user must log in again.
    pub fn is_session_ended(&self) -> bool {
        matches!(
            self,
            ApiError::RefreshFailed(_) | ApiError::RefreshAborted | ApiError::NotAuthenticated
        )
    }
}

fn detail_of(data: &Value) -> Option<String> {
    data.get("detail").and_then(Value::as_str).map(str::to_string)
}
