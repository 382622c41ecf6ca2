//! Accept-Language resolution.

use std::sync::Arc;

use crate::storage::Storage;

/// Key written by the UI language detector; the explicit user choice.
pub const USER_LANGUAGE_KEY: &str = "i18nextLng";
/// Secondary stored default.
pub const DEFAULT_LANGUAGE_KEY: &str = "lang";

/// Resolves the language sent with every request.
///
/// Preference order: explicit user setting, then the stored default, then
/// the configured fallback.
#[derive(Clone)]
pub struct LanguageResolver {
    storage: Arc<dyn Storage>,
    fallback: String,
}

impl LanguageResolver {
    pub fn new(storage: Arc<dyn Storage>, fallback: impl Into<String>) -> Self {
        Self {
            storage,
            fallback: fallback.into(),
        }
    }

    /// Current language code.
    pub fn resolve(&self) -> String {
        [USER_LANGUAGE_KEY, DEFAULT_LANGUAGE_KEY]
            .iter()
            .filter_map(|key| self.storage.get(key))
            .find(|lang| !lang.trim().is_empty())
            .unwrap_or_else(|| self.fallback.clone())
    }

    /// Switch language; the choice applies to every subsequent request.
    pub fn set_language(&self, lang: &str) {
        self.storage.set(USER_LANGUAGE_KEY, lang);
        self.storage.set(DEFAULT_LANGUAGE_KEY, lang);
    }
}
