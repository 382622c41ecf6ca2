//! Login and logout endpoints.

use serde::Serialize;

use crate::auth::tokens::TokenPair;
use crate::http::{ApiClient, ApiError, ApiRequest};

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct LogoutRequest<'a> {
    refresh: &'a str,
}

#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `POST /auth/login/`. Does not store the pair; callers decide that.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, ApiError> {
        let request = ApiRequest::post("/auth/login/").json(&Credentials { email, password })?;
        self.client.fetch(request).await
    }

    /// `POST /auth/logout/`, blacklisting the refresh token server-side.
    pub async fn logout(&self, refresh: &str) -> Result<(), ApiError> {
        let request = ApiRequest::post("/auth/logout/").json(&LogoutRequest { refresh })?;
        self.client.send(request).await?;
        Ok(())
    }
}
