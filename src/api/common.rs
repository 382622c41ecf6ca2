//! Endpoints available to every signed-in role.

use crate::api::models::{SearchResults, User};
use crate::http::{ApiClient, ApiError, ApiRequest};

/// Result count per section when the caller does not pick one.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

#[derive(Debug, Clone)]
pub struct CommonApi {
    client: ApiClient,
}

impl CommonApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /me/`
    pub async fn me(&self) -> Result<User, ApiError> {
        self.client.fetch(ApiRequest::get("/me/")).await
    }

    /// `GET /search/?q=..&limit=..`. A blank query is rejected by the server with 400.
    pub async fn search(&self, q: &str, limit: Option<u32>) -> Result<SearchResults, ApiError> {
        let request = ApiRequest::get("/search/")
            .param("q", q)
            .param("limit", limit.unwrap_or(DEFAULT_SEARCH_LIMIT));
        self.client.fetch(request).await
    }
}
