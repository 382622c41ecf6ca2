//! Typed method sets over [`ApiClient`].
//!
//! # Data Flow
//! ```text
//! auth.rs / common.rs / admin.rs / doctor.rs
//!     → Resource (REST collection helper)
//!     → http::ApiClient::fetch
//!     → models.rs (decoded body) or ApiError
//! ```
//!
//! Records the client does not reason about are returned as `serde_json::Value`.

pub mod admin;
pub mod auth;
pub mod common;
pub mod doctor;
pub mod models;

use serde::Serialize;
use serde_json::Value;

use crate::http::{ApiClient, ApiError, ApiRequest};
use models::Page;

pub use admin::AdminApi;
pub use auth::AuthApi;
pub use common::CommonApi;
pub use doctor::DoctorApi;

/// Query parameters for list endpoints.
pub type Params = Vec<(String, String)>;

/// A REST collection rooted at `base` (with trailing slash).
#[derive(Debug, Clone)]
pub struct Resource {
    client: ApiClient,
    base: String,
}

impl Resource {
    pub(crate) fn new(client: ApiClient, base: impl Into<String>) -> Self {
        Self {
            client,
            base: base.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.base
    }

    fn item(&self, id: i64) -> String {
        format!("{}{}/", self.base, id)
    }

    /// `GET <base>` with filters, unwrapped into a page.
    pub async fn list(&self, params: Params) -> Result<Page<Value>, ApiError> {
        let data: Value = self.client.fetch(ApiRequest::get(&self.base).params(params)).await?;
        Page::from_value(data)
    }

    pub async fn get(&self, id: i64) -> Result<Value, ApiError> {
        self.client.fetch(ApiRequest::get(self.item(id))).await
    }

    pub async fn create<T: Serialize + ?Sized>(&self, payload: &T) -> Result<Value, ApiError> {
        self.client.fetch(ApiRequest::post(&self.base).json(payload)?).await
    }

    pub async fn patch<T: Serialize + ?Sized>(&self, id: i64, payload: &T) -> Result<Value, ApiError> {
        self.client.fetch(ApiRequest::patch(self.item(id)).json(payload)?).await
    }

    /// `DELETE <base><id>/`; the server answers 204 with no body.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.send(ApiRequest::delete(self.item(id))).await?;
        Ok(())
    }
}

/// Turn `key=value` pairs into list parameters.
pub fn params<I, K, V>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: ToString,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.to_string())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params() {
        let p = params([("page", 2), ("page_size", 50)]);
        assert_eq!(
            p,
            vec![
                ("page".to_string(), "2".to_string()),
                ("page_size".to_string(), "50".to_string())
            ]
        );
    }

    #[test]
    fn test_resource_item_path() {
        let client = ApiClient::builder()
            .base_url("http://clinic.test/api")
            .build()
            .unwrap();
        let rooms = Resource::new(client, "/admin/rooms/");
        assert_eq!(rooms.path(), "/admin/rooms/");
        assert_eq!(rooms.item(4), "/admin/rooms/4/");
    }
}
