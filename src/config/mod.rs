//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + DOCTOR_CRM_API_BASE_URL
//!     → loader.rs (parse, deserialize, apply override)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → handed to ApiClient / storage construction
//! ```
//!
//! All fields have defaults so a missing file still yields a usable config.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::ApiConfig;
pub use schema::ClientConfig;
pub use schema::StorageBackend;
pub use schema::StorageConfig;
