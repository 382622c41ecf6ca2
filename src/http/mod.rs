//! HTTP client subsystem.
//!
//! # Data Flow
//! ```text
//! API method set (api/*)
//!     → request.rs (ApiRequest: method, path, query, headers, body)
//!     → client.rs (pipeline, 401 recovery)
//!         → interceptor.rs + language.rs (decorate headers)
//!         → transport.rs (reqwest)
//!     → response.rs (ApiResponse) or error.rs (ApiError)
//! ```

pub mod client;
pub mod error;
pub mod interceptor;
pub mod language;
pub mod request;
pub mod response;
pub mod transport;

pub use client::{ApiClient, ApiClientBuilder};
pub use error::{ApiError, TransportError, TransportErrorKind};
pub use interceptor::{RequestDecorator, X_REQUEST_ID};
pub use language::LanguageResolver;
pub use request::{ApiRequest, MultipartBody, RequestBody};
pub use response::ApiResponse;
pub use transport::{ReqwestTransport, Transport};
