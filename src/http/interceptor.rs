//! Request decoration.
//!
//! # Responsibilities
//! - Attach `Authorization: Bearer <access>` when a token is stored
//! - Attach `Accept-Language` on every request
//! - Negotiate the content type: strip it for multipart, default to JSON otherwise
//! - Stamp an `X-Request-ID` once per logical request (kept across replays)
//!
//! Decoration only rewrites metadata. It never fails and is idempotent:
//! decorating the same request twice yields the same header set.

use reqwest::header::{HeaderValue, ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE};

use crate::auth::tokens::TokenStore;
use crate::http::language::LanguageResolver;
use crate::http::request::ApiRequest;

/// Header carrying the per-request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Build a bearer `Authorization` value. Tokens that are not valid header
/// text are dropped rather than failing the request.
pub fn bearer(token: &str) -> Option<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}")).ok()?;
    value.set_sensitive(true);
    Some(value)
}

/// Mutates every outgoing request before it reaches the transport.
#[derive(Clone)]
pub struct RequestDecorator {
    tokens: TokenStore,
    language: LanguageResolver,
}

impl RequestDecorator {
    pub fn new(tokens: TokenStore, language: LanguageResolver) -> Self {
        Self { tokens, language }
    }

    pub fn decorate(&self, request: &mut ApiRequest) {
        if let Some(value) = self.tokens.access().as_deref().and_then(bearer) {
            request.headers.insert(AUTHORIZATION, value);
        }

        let lang = self.language.resolve();
        match HeaderValue::from_str(&lang) {
            Ok(value) => {
                request.headers.insert(ACCEPT_LANGUAGE, value);
            }
            Err(_) => tracing::warn!(lang = %lang, "Ignoring language code that is not a valid header value"),
        }

        if request.body.is_multipart() {
            // The transport sets multipart/form-data with its boundary.
            request.headers.remove(CONTENT_TYPE);
        } else if !request.headers.contains_key(CONTENT_TYPE) {
            request
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        if !request.headers.contains_key(X_REQUEST_ID) {
            if let Ok(value) = HeaderValue::from_str(&uuid::Uuid::new_v4().to_string()) {
                request.headers.insert(X_REQUEST_ID, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tokens::TokenPair;
    use crate::http::request::MultipartBody;
    use crate::storage::{MemoryStorage, Storage};
    use std::sync::Arc;

    fn decorator() -> (RequestDecorator, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let tokens = TokenStore::new(storage.clone());
        let language = LanguageResolver::new(storage.clone(), "ru");
        (RequestDecorator::new(tokens, language), storage)
    }

    #[test]
    fn test_anonymous_request() {
        let (decorator, _) = decorator();
        let mut request = ApiRequest::post("/auth/login/");
        decorator.decorate(&mut request);

        assert!(request.headers.get(AUTHORIZATION).is_none());
        assert_eq!(request.headers[ACCEPT_LANGUAGE], "ru");
        assert_eq!(request.headers[CONTENT_TYPE], "application/json");
        assert!(request.headers.contains_key(X_REQUEST_ID));
    }

    #[test]
    fn test_authorized_request() {
        let (decorator, storage) = decorator();
        TokenStore::new(storage.clone()).set_tokens(&TokenPair {
            access: "A1".into(),
            refresh: Some("R1".into()),
        });
        storage.set("lang", "en");

        let mut request = ApiRequest::get("/me/");
        decorator.decorate(&mut request);
        assert_eq!(request.headers[AUTHORIZATION], "Bearer A1");
        assert_eq!(request.headers[ACCEPT_LANGUAGE], "en");
    }

    #[test]
    fn test_decoration_is_idempotent() {
        let (decorator, storage) = decorator();
        TokenStore::new(storage).set_access("A1");

        let mut request = ApiRequest::get("/me/");
        decorator.decorate(&mut request);
        let first = request.headers.clone();
        decorator.decorate(&mut request);

        assert_eq!(request.headers, first);
        assert_eq!(request.headers.get_all(AUTHORIZATION).iter().count(), 1);
        assert_eq!(request.headers.get_all(ACCEPT_LANGUAGE).iter().count(), 1);
        assert_eq!(request.headers.get_all(X_REQUEST_ID).iter().count(), 1);
    }

    #[test]
    fn test_explicit_content_type_kept() {
        let (decorator, _) = decorator();
        let mut request = ApiRequest::post("/import/")
            .header(CONTENT_TYPE, HeaderValue::from_static("text/csv"));
        decorator.decorate(&mut request);
        assert_eq!(request.headers[CONTENT_TYPE], "text/csv");
    }

    #[test]
    fn test_multipart_never_gets_json_content_type() {
        let (decorator, _) = decorator();
        let mut request = ApiRequest::post("/doctor/visit-notes/1/attachments/")
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .multipart(MultipartBody::new().file("file", "scan.png", None, vec![0x89]));
        decorator.decorate(&mut request);
        assert!(request.headers.get(CONTENT_TYPE).is_none());

        decorator.decorate(&mut request);
        assert!(request.headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_token_refreshed_between_decorations() {
        let (decorator, storage) = decorator();
        let tokens = TokenStore::new(storage);
        tokens.set_access("A1");
        let mut request = ApiRequest::get("/me/");
        decorator.decorate(&mut request);

        tokens.set_access("A2");
        decorator.decorate(&mut request);
        assert_eq!(request.headers[AUTHORIZATION], "Bearer A2");
    }

    #[test]
    fn test_bearer_is_sensitive() {
        assert!(bearer("A1").unwrap().is_sensitive());
        assert!(bearer("bad\ntoken").is_none());
    }
}
