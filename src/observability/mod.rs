//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Client pipeline produces:
//!     → logging.rs (structured log events, request_id on every dispatch)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stderr via tracing-subscriber (binary)
//!     → whatever metrics recorder the embedding application installs
//! ```
//!
//! Tokens never appear in log fields.

pub mod logging;
pub mod metrics;
