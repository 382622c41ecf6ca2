//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! session.rs (who is signed in)
//!     → tokens.rs (access/refresh pair in Storage)
//!     → refresh.rs (single-flight refresh used by http::client)
//! ```

pub mod refresh;
pub mod session;
pub mod tokens;

pub use refresh::{RefreshCoordinator, RefreshLease, RefreshOutcome, RefreshWaiter, Ticket};
pub use session::AuthSession;
pub use tokens::{TokenPair, TokenStore};
