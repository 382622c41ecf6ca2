//! Doctor CRM API client library.
//!
//! Authenticated HTTP access to the clinic backend: bearer tokens, language
//! headers, and transparent single-flight recovery from expired access tokens.

pub mod api;
pub mod auth;
pub mod config;
pub mod http;
pub mod observability;
pub mod storage;

pub use auth::{AuthSession, TokenPair, TokenStore};
pub use config::ClientConfig;
pub use http::{ApiClient, ApiError, ApiRequest, ApiResponse};
pub use storage::Storage;
