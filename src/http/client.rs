//! Authenticated API client.
//!
//! # Responsibilities
//! - Resolve request paths against the configured base URL
//! - Run every request through decoration → transport → status check
//! - Recover from an expired access token with a single-flight refresh and
//!   replay the rejected request with the new token
//!
//! # Data Flow
//! ```text
//! send(request)
//!     → interceptor.rs (Authorization, Accept-Language, Content-Type)
//!     → transport.rs (network)
//!     → 2xx: response
//!     → 401, refresh token stored, not yet retried:
//!         → refresh.rs (leader refreshes, others queue)
//!         → replay with new Authorization
//!     → anything else: ApiError to the caller
//! ```

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::auth::refresh::{RefreshCoordinator, RefreshOutcome, Ticket};
use crate::auth::tokens::TokenStore;
use crate::config::ClientConfig;
use crate::http::error::ApiError;
use crate::http::interceptor::{bearer, RequestDecorator, X_REQUEST_ID};
use crate::http::language::LanguageResolver;
use crate::http::request::ApiRequest;
use crate::http::response::ApiResponse;
use crate::http::transport::{ReqwestTransport, Transport};
use crate::observability::metrics;
use crate::storage::{self, MemoryStorage, Storage};

/// Token refresh endpoint, relative to the base URL.
pub const REFRESH_PATH: &str = "/auth/refresh/";

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

struct ClientInner {
    base_url: String,
    transport: Arc<dyn Transport>,
    tokens: TokenStore,
    language: LanguageResolver,
    decorator: RequestDecorator,
    refresh: RefreshCoordinator,
}

/// Clinic API client. Clones share the session, so a refresh triggered by
/// one clone is seen by all of them.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    /// Create a client builder.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Build a client with storage and transport selected by configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::builder()
            .base_url(config.api.base_url.clone())
            .storage(storage::from_config(&config.storage))
            .transport(Arc::new(ReqwestTransport::new(config)?))
            .fallback_language(config.language.fallback.clone())
            .build()
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The session's token store.
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// The session's language preference.
    pub fn language(&self) -> &LanguageResolver {
        &self.inner.language
    }

    /// The session's refresh coordinator.
    pub fn refresh_coordinator(&self) -> &RefreshCoordinator {
        &self.inner.refresh
    }

    /// Send a request and return the final response or a structured error.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        match self.dispatch(&mut request).await {
            Err(err) if Self::needs_refresh(&err, &request) => self.recover(request, err).await,
            other => other,
        }
    }

    /// Send a request and decode the response body.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        self.send(request).await?.into_json()
    }

    fn needs_refresh(err: &ApiError, request: &ApiRequest) -> bool {
        matches!(err, ApiError::Status { status, .. } if *status == StatusCode::UNAUTHORIZED)
            && !request.retried
    }

    /// Resolve a request path (and query) against the base URL.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let path = request.path.trim_start_matches('/');
        let raw = format!("{}/{}", self.inner.base_url, path);
        let mut url = Url::parse(&raw)
            .map_err(|e| ApiError::Configuration(format!("invalid request URL '{raw}': {e}")))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }

    async fn dispatch(&self, request: &mut ApiRequest) -> Result<ApiResponse, ApiError> {
        self.inner.decorator.decorate(request);
        let url = self.url_for(request)?;

        let request_id = request
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            request_id = %request_id,
            retried = request.retried,
            "Dispatching request"
        );

        let response = match self.inner.transport.send(url, request).await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_transport_error(e.kind.as_str());
                tracing::warn!(
                    method = %request.method,
                    path = %request.path,
                    request_id = %request_id,
                    error = %e,
                    "Request failed without response"
                );
                return Err(e.into());
            }
        };

        metrics::record_request(request.method.as_str(), response.status.as_u16());
        tracing::debug!(status = response.status.as_u16(), request_id = %request_id, "Response received");

        if response.is_success() {
            Ok(response)
        } else {
            Err(ApiError::from_status(response.status, response.data))
        }
    }

    async fn recover(&self, mut request: ApiRequest, unauthorized: ApiError) -> Result<ApiResponse, ApiError> {
        let Some(refresh) = self.inner.tokens.refresh() else {
            tracing::debug!(path = %request.path, "Unauthorized and no refresh token stored");
            return Err(unauthorized);
        };

        request.retried = true;
        tracing::info!(path = %request.path, "Access token rejected, recovering session");

        let access = match self.inner.refresh.enter() {
            Ticket::Waiter(waiter) => waiter.wait().await?,
            Ticket::Leader(lease) => {
                let outcome = self.refresh_access(&refresh).await;
                // Tokens are updated before the lease settles: once the
                // coordinator is Idle, the rejected refresh token is gone.
                match &outcome {
                    Ok(access) => self.inner.tokens.set_access(access),
                    Err(_) => self.inner.tokens.clear(),
                }
                lease.settle(outcome)?
            }
        };

        if let Some(value) = bearer(&access) {
            request.headers.insert(AUTHORIZATION, value);
        }
        self.dispatch(&mut request).await
    }

    /// Exchange the refresh token for a new access token. Goes straight to
    /// the transport: no decoration, no recovery.
    async fn refresh_access(&self, refresh: &str) -> RefreshOutcome {
        let request = ApiRequest::post(REFRESH_PATH)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json_value(json!({ "refresh": refresh }));

        match self.exchange(&request).await {
            Ok(access) => {
                metrics::record_refresh("success");
                tracing::info!("Access token refreshed");
                Ok(access)
            }
            Err(e) => {
                metrics::record_refresh("failure");
                tracing::warn!(error = %e, "Token refresh failed, clearing session");
                Err(ApiError::RefreshFailed(Box::new(e)))
            }
        }
    }

    async fn exchange(&self, request: &ApiRequest) -> Result<String, ApiError> {
        let url = self.url_for(request)?;
        let response = self.inner.transport.send(url, request).await?;
        if !response.is_success() {
            return Err(ApiError::from_status(response.status, response.data));
        }
        Ok(response.into_json::<RefreshResponse>()?.access)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("tokens", &self.inner.tokens)
            .finish()
    }
}

/// Builder for [`ApiClient`].
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    storage: Option<Arc<dyn Storage>>,
    transport: Option<Arc<dyn Transport>>,
    fallback_language: Option<String>,
}

impl ApiClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the storage holding tokens and the language preference
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Set the transport
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the language used when no preference is stored
    pub fn fallback_language(mut self, lang: impl Into<String>) -> Self {
        self.fallback_language = Some(lang.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ApiError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| ApiError::Configuration(format!("invalid base_url '{base_url}': {e}")))?;

        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()));
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&ClientConfig::default())?),
        };
        let fallback = self
            .fallback_language
            .unwrap_or_else(|| ClientConfig::default().language.fallback);

        let tokens = TokenStore::new(storage.clone());
        let language = LanguageResolver::new(storage, fallback);
        let decorator = RequestDecorator::new(tokens.clone(), language.clone());

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                base_url,
                transport,
                tokens,
                language,
                decorator,
                refresh: RefreshCoordinator::new(),
            }),
        })
    }
}
