//! Administrator endpoints under `/admin/`.

use serde_json::Value;

use crate::api::models::Page;
use crate::api::{Params, Resource};
use crate::http::{ApiClient, ApiError, ApiRequest};

#[derive(Debug, Clone)]
pub struct AdminApi {
    client: ApiClient,
}

impl AdminApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn doctors(&self) -> Resource {
        Resource::new(self.client.clone(), "/admin/doctors/")
    }

    pub fn patients(&self) -> Resource {
        Resource::new(self.client.clone(), "/admin/patients/")
    }

    pub fn services(&self) -> Resource {
        Resource::new(self.client.clone(), "/admin/services/")
    }

    pub fn rooms(&self) -> Resource {
        Resource::new(self.client.clone(), "/admin/rooms/")
    }

    pub fn appointments(&self) -> Resource {
        Resource::new(self.client.clone(), "/admin/appointments/")
    }

    /// Read-only audit trail.
    pub async fn audit_logs(&self, params: Params) -> Result<Page<Value>, ApiError> {
        Resource::new(self.client.clone(), "/admin/audit-logs/")
            .list(params)
            .await
    }

    /// Appointment counts; filters are `date_from`, `date_to`, `doctor`, `status`.
    pub async fn appointments_report(&self, params: Params) -> Result<Value, ApiError> {
        self.client
            .fetch(ApiRequest::get("/admin/reports/appointments/").params(params))
            .await
    }
}
