//! Doctor endpoints under `/doctor/`.
//!
//! Every collection here is scoped server-side to the signed-in doctor.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::models::{AppointmentStatus, Page};
use crate::api::{params, Params, Resource};
use crate::http::{ApiClient, ApiError, ApiRequest, MultipartBody};

/// Form field the attachment upload expects.
pub const ATTACHMENT_FIELD: &str = "file";

/// Input for `/ai/note-draft/`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NoteDraftRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bullets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_text: Option<String>,
    /// `en`, `ru` or `kk`; the server defaults to `en`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NoteDraft {
    pub draft: String,
}

#[derive(Serialize)]
struct PatientSummaryRequest<'a> {
    patient_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SummaryItem {
    pub date: String,
    pub appointment_id: Option<i64>,
    pub snippet: String,
}

/// Recent visit-note snippets for one patient.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PatientSummary {
    pub title: String,
    #[serde(default)]
    pub items: Vec<SummaryItem>,
}

#[derive(Serialize)]
struct SetStatus {
    status: AppointmentStatus,
}

#[derive(Debug, Clone)]
pub struct DoctorApi {
    client: ApiClient,
}

impl DoctorApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn appointments(&self) -> Resource {
        Resource::new(self.client.clone(), "/doctor/appointments/")
    }

    pub fn visit_notes(&self) -> Resource {
        Resource::new(self.client.clone(), "/doctor/visit-notes/")
    }

    pub fn patients(&self) -> Resource {
        Resource::new(self.client.clone(), "/doctor/patients/")
    }

    pub fn schedule(&self) -> Resource {
        Resource::new(self.client.clone(), "/doctor/schedule/")
    }

    pub fn time_off(&self) -> Resource {
        Resource::new(self.client.clone(), "/doctor/time-off/")
    }

    /// `POST /doctor/appointments/{id}/set_status/`
    pub async fn set_status(&self, appointment: i64, status: AppointmentStatus) -> Result<Value, ApiError> {
        let request = ApiRequest::post(format!("/doctor/appointments/{appointment}/set_status/"))
            .json(&SetStatus { status })?;
        self.client.fetch(request).await
    }

    /// The visit note written for an appointment, if any.
    pub async fn find_visit_note_by_appointment(&self, appointment: i64) -> Result<Option<Value>, ApiError> {
        let page = self
            .visit_notes()
            .list(params([("appointment", appointment), ("page_size", 1)]))
            .await?;
        Ok(page.items.into_iter().next())
    }

    /// `GET /doctor/patients/{id}/history/`
    pub async fn patient_history(&self, patient: i64) -> Result<Value, ApiError> {
        self.client
            .fetch(ApiRequest::get(format!("/doctor/patients/{patient}/history/")))
            .await
    }

    fn attachments_path(note: i64) -> String {
        format!("/doctor/visit-notes/{note}/attachments/")
    }

    pub async fn list_attachments(&self, note: i64) -> Result<Page<Value>, ApiError> {
        let data: Value = self.client.fetch(ApiRequest::get(Self::attachments_path(note))).await?;
        Page::from_value(data)
    }

    /// Upload a file as multipart form data.
    pub async fn upload_attachment(
        &self,
        note: i64,
        file_name: &str,
        mime: Option<String>,
        bytes: Vec<u8>,
    ) -> Result<Value, ApiError> {
        let form = MultipartBody::new().file(ATTACHMENT_FIELD, file_name, mime, bytes);
        self.client
            .fetch(ApiRequest::post(Self::attachments_path(note)).multipart(form))
            .await
    }

    pub async fn delete_attachment(&self, note: i64, attachment: i64) -> Result<(), ApiError> {
        let path = format!("{}{attachment}/", Self::attachments_path(note));
        self.client.send(ApiRequest::delete(path)).await?;
        Ok(())
    }

    /// `POST /ai/note-draft/`: a structured visit-note draft from bullets and free text.
    pub async fn note_draft(&self, input: &NoteDraftRequest) -> Result<NoteDraft, ApiError> {
        self.client
            .fetch(ApiRequest::post("/ai/note-draft/").json(input)?)
            .await
    }

    /// `POST /ai/patient-summary/`. The server answers 403 for patients the
    /// doctor has never seen; `limit` is capped at 20 server-side.
    pub async fn patient_summary(
        &self,
        patient: i64,
        limit: Option<u32>,
        language: Option<&str>,
    ) -> Result<PatientSummary, ApiError> {
        let body = PatientSummaryRequest {
            patient_id: patient,
            limit,
            language,
        };
        self.client
            .fetch(ApiRequest::post("/ai/patient-summary/").json(&body)?)
            .await
    }

    /// Convenience wrapper over [`Resource::list`] for the doctor's agenda.
    pub async fn list_appointments(&self, params: Params) -> Result<Page<Value>, ApiError> {
        self.appointments().list(params).await
    }
}
