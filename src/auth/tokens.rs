//! Token storage.
//!
//! Single source of truth for the current access/refresh token pair. The
//! store holds no state of its own: every read goes to the injected
//! [`Storage`], so two stores over the same storage always agree.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::storage::Storage;

/// Storage key of the access token.
pub const ACCESS_KEY: &str = "access";
/// Storage key of the refresh token.
pub const REFRESH_KEY: &str = "refresh";

/// A token pair as issued by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Persists and retrieves the session tokens.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Current access token, if any.
    pub fn access(&self) -> Option<String> {
        self.storage.get(ACCESS_KEY).filter(|t| !t.is_empty())
    }

    /// Current refresh token, if any.
    pub fn refresh(&self) -> Option<String> {
        self.storage.get(REFRESH_KEY).filter(|t| !t.is_empty())
    }

    /// Persist a token pair. The refresh token is only overwritten when supplied.
    pub fn set_tokens(&self, tokens: &TokenPair) {
        self.storage.set(ACCESS_KEY, &tokens.access);
        if let Some(refresh) = &tokens.refresh {
            self.storage.set(REFRESH_KEY, refresh);
        }
    }

    /// Replace only the access token.
    pub fn set_access(&self, access: &str) {
        self.storage.set(ACCESS_KEY, access);
    }

    /// Remove both tokens.
    pub fn clear(&self) {
        self.storage.remove(ACCESS_KEY);
        self.storage.remove(REFRESH_KEY);
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("has_access", &self.access().is_some())
            .field("has_refresh", &self.refresh().is_some())
            .finish()
    }
}
