//! Signed-in session state.
//!
//! # States
//! - Anonymous: no user loaded (tokens may or may not be stored)
//! - Authenticated: `/me/` succeeded with the stored tokens
//!
//! # State Transitions
//! ```text
//! Anonymous → Authenticated: login() or bootstrap() with a usable token
//! Authenticated → Anonymous: logout(), or a failed bootstrap
//! ```

use std::sync::{PoisonError, RwLock};

use crate::api::models::{Role, User};
use crate::api::{AuthApi, CommonApi};
use crate::http::{ApiClient, ApiError};

/// The current user plus the operations that change it.
#[derive(Debug)]
pub struct AuthSession {
    client: ApiClient,
    auth: AuthApi,
    common: CommonApi,
    user: RwLock<Option<User>>,
}

impl AuthSession {
    pub fn new(client: ApiClient) -> Self {
        Self {
            auth: AuthApi::new(client.clone()),
            common: CommonApi::new(client.clone()),
            client,
            user: RwLock::new(None),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Restore a session from stored tokens. Any failure clears the tokens
    /// and leaves the session anonymous.
    pub async fn bootstrap(&self) -> Option<User> {
        if self.client.tokens().access().is_none() {
            tracing::debug!("No stored access token, starting anonymous");
            return None;
        }

        match self.common.me().await {
            Ok(user) => {
                tracing::info!(user_id = user.id, role = %user.role, "Session restored");
                self.set_user(Some(user.clone()));
                Some(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored session unusable, clearing tokens");
                self.client.tokens().clear();
                self.set_user(None);
                None
            }
        }
    }

    /// Exchange credentials for tokens, store them, and load the user.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let tokens = self.auth.login(email, password).await?;
        self.client.tokens().set_tokens(&tokens);

        let user = self.common.me().await?;
        tracing::info!(user_id = user.id, role = %user.role, "Signed in");
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    /// Sign out. The server call is best-effort; local state is always cleared.
    pub async fn logout(&self) {
        if let Some(refresh) = self.client.tokens().refresh() {
            if let Err(e) = self.auth.logout(&refresh).await {
                tracing::debug!(error = %e, "Server logout failed, clearing locally");
            }
        }
        self.client.tokens().clear();
        self.set_user(None);
        tracing::info!("Signed out");
    }

    pub fn user(&self) -> Option<User> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authed(&self) -> bool {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Gate an action on the signed-in user's role.
    pub fn require_role(&self, required: Role) -> Result<User, ApiError> {
        match self.user() {
            None => Err(ApiError::NotAuthenticated),
            Some(user) if user.role == required => Ok(user),
            Some(user) => {
                tracing::debug!(user_id = user.id, role = %user.role, %required, "Role check failed");
                Err(ApiError::Forbidden { required })
            }
        }
    }

    fn set_user(&self, user: Option<User>) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = user;
    }
}
