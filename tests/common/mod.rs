//! Shared utilities for integration testing: a programmable mock clinic API.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{OriginalUri, Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use doctor_crm_client::auth::TokenPair;
use doctor_crm_client::http::ReqwestTransport;
use doctor_crm_client::storage::MemoryStorage;
use doctor_crm_client::{ApiClient, ClientConfig};

pub const EMAIL: &str = "doc@clinic.test";
pub const PASSWORD: &str = "secret";

/// One request as the mock server saw it. `path` includes the `/api` prefix.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub accept_language: Option<String>,
    pub content_type: Option<String>,
    pub request_id: Option<String>,
}

/// Mutable server behaviour and observations.
#[derive(Debug)]
pub struct MockState {
    /// The only access token protected routes accept.
    pub valid_access: String,
    /// The refresh token the refresh endpoint accepts.
    pub refresh_token: String,
    /// Access token issued by the next successful refresh.
    pub next_access: String,
    /// Status the refresh endpoint fails with; `None` means it succeeds.
    pub refresh_failure: Option<StatusCode>,
    /// Whether a successful refresh makes `next_access` the accepted token.
    pub accept_refreshed: bool,
    pub refresh_delay: Duration,
    pub refresh_calls: usize,
    pub requests: Vec<Recorded>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            valid_access: "A1".into(),
            refresh_token: "R1".into(),
            next_access: "A2".into(),
            refresh_failure: None,
            accept_refreshed: true,
            refresh_delay: Duration::from_millis(150),
            refresh_calls: 0,
            requests: Vec::new(),
        }
    }
}

pub type Shared = Arc<Mutex<MockState>>;

pub struct MockServer {
    pub addr: SocketAddr,
    pub state: Shared,
}

impl MockServer {
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.lock().unwrap().refresh_calls
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    /// Make the currently accepted access token expire.
    pub fn expire_access(&self, now_valid: &str) {
        self.state.lock().unwrap().valid_access = now_valid.into();
    }

    pub fn update(&self, f: impl FnOnce(&mut MockState)) {
        f(&mut self.state.lock().unwrap());
    }

    /// A client talking to this server over real HTTP.
    pub fn client(&self) -> ApiClient {
        let mut config = ClientConfig::default();
        config.api.base_url = self.base_url();
        ApiClient::builder()
            .base_url(self.base_url())
            .storage(Arc::new(MemoryStorage::new()))
            .transport(Arc::new(ReqwestTransport::new(&config).unwrap()))
            .build()
            .unwrap()
    }

    /// A client already holding `access` and the `R1` refresh token.
    pub fn signed_in_client(&self, access: &str) -> ApiClient {
        let client = self.client();
        client.tokens().set_tokens(&TokenPair {
            access: access.into(),
            refresh: Some("R1".into()),
        });
        client
    }
}

/// Start the mock API on a random local port.
pub async fn start_mock_api() -> MockServer {
    start_mock_api_with(MockState::default()).await
}

pub async fn start_mock_api_with(state: MockState) -> MockServer {
    let state: Shared = Arc::new(Mutex::new(state));

    let api = Router::new()
        .route("/auth/login/", post(login))
        .route("/auth/refresh/", post(refresh))
        .route("/auth/logout/", post(logout))
        .route("/me/", get(me))
        .route("/search/", get(search))
        .route("/echo/", get(echo).post(echo))
        .route("/doctor/appointments/", get(doctor_appointments))
        .route("/doctor/appointments/{id}/set_status/", post(set_status))
        .route("/doctor/visit-notes/", get(visit_notes))
        .route("/doctor/visit-notes/{id}/attachments/", post(upload_attachment))
        .route("/doctor/patients/{id}/history/", get(patient_history))
        .route("/ai/note-draft/", post(note_draft))
        .route("/ai/patient-summary/", post(patient_summary))
        .route("/admin/rooms/", get(rooms).post(create_room))
        .route("/admin/rooms/{id}/", axum::routing::delete(delete_room))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state.clone());
    let app = Router::new().nest("/api", api);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockServer { addr, state }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let headers = request.headers();
    let recorded = Recorded {
        method: request.method().to_string(),
        path: request
            .extensions()
            .get::<OriginalUri>()
            .map(|uri| uri.0.path().to_string())
            .unwrap_or_else(|| request.uri().path().to_string()),
        authorization: header(headers, "authorization"),
        accept_language: header(headers, "accept-language"),
        content_type: header(headers, "content-type"),
        request_id: header(headers, "x-request-id"),
    };
    state.lock().unwrap().requests.push(recorded);
    next.run(request).await
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "detail": "Given token not valid for any token type",
            "code": "token_not_valid"
        })),
    )
        .into_response()
}

fn authorize(state: &Shared, headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Bearer {}", state.lock().unwrap().valid_access);
    if header(headers, "authorization").as_deref() == Some(expected.as_str()) {
        Ok(())
    } else {
        Err(unauthorized())
    }
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] == EMAIL && body["password"] == PASSWORD {
        Json(json!({"access": "A1", "refresh": "R1"})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
            .into_response()
    }
}

async fn refresh(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let delay = {
        let mut s = state.lock().unwrap();
        s.refresh_calls += 1;
        s.refresh_delay
    };
    tokio::time::sleep(delay).await;

    let mut s = state.lock().unwrap();
    if let Some(status) = s.refresh_failure {
        return (status, Json(json!({"detail": "Refresh rejected", "code": "token_not_valid"}))).into_response();
    }
    if body["refresh"] != s.refresh_token.as_str() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Token is invalid or expired", "code": "token_not_valid"})),
        )
            .into_response();
    }
    if s.accept_refreshed {
        s.valid_access = s.next_access.clone();
    }
    Json(json!({"access": s.next_access})).into_response()
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(rejected) = authorize(&state, &headers) {
        return rejected;
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(rejected) = authorize(&state, &headers) {
        return rejected;
    }
    Json(json!({
        "id": 7,
        "email": EMAIL,
        "role": "DOCTOR",
        "first_name": "Ivan",
        "last_name": "Petrov",
        "doctor_profile": {
            "full_name": "Ivan Petrov",
            "specialization": "Therapist",
            "phone": "+7 900 000 00 00",
            "room": "101"
        }
    }))
    .into_response()
}

async fn search(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    if let Err(rejected) = authorize(&state, &headers) {
        return rejected;
    }
    let q = query
        .iter()
        .find(|(k, _)| k == "q")
        .map(|(_, v)| v.trim().to_string())
        .unwrap_or_default();
    if q.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({"detail": "Query parameter 'q' is required."}))).into_response();
    }
    Json(json!({
        "patients": [{"id": 1, "full_name": format!("{q} Ivanov"), "phone": "", "email": ""}],
        "services": [{"id": 2, "code": "CONS", "name": "Consultation", "duration_minutes": 30, "price": "1500.00"}],
        "appointments": []
    }))
    .into_response()
}

async fn echo(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(rejected) = authorize(&state, &headers) {
        return rejected;
    }
    Json(json!({
        "authorization": header(&headers, "authorization"),
        "accept_language": header(&headers, "accept-language"),
        "content_type": header(&headers, "content-type"),
    }))
    .into_response()
}

async fn doctor_appointments(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(rejected) = authorize(&state, &headers) {
        return rejected;
    }
    Json(json!({
        "count": 12,
        "next": "http://testserver/api/doctor/appointments/?page=2",
        "previous": null,
        "results": [
            {"id": 1, "status": "SCHEDULED", "patient": 3},
            {"id": 2, "status": "CONFIRMED", "patient": {"id": 4, "full_name": "Anna Smirnova"}}
        ]
    }))
    .into_response()
}

async fn set_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejected) = authorize(&state, &headers) {
        return rejected;
    }
    match body.get("status").and_then(Value::as_str) {
        Some(status) => Json(json!({"id": id, "status": status})).into_response(),
        None => (StatusCode::BAD_REQUEST, Json(json!({"detail": "status is required"}))).into_response(),
    }
}

async fn visit_notes(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    if let Err(rejected) = authorize(&state, &headers) {
        return rejected;
    }
    let appointment = query.iter().find(|(k, _)| k == "appointment").map(|(_, v)| v.as_str());
    let results = match appointment {
        Some("5") => json!([{"id": 50, "appointment": 5, "diagnosis": "ARVI"}]),
        Some(_) => json!([]),
        None => json!([{"id": 50, "appointment": 5}, {"id": 51, "appointment": 6}]),
    };
    let count = results.as_array().map(Vec::len).unwrap_or(0);
    Json(json!({"count": count, "next": null, "previous": null, "results": results})).into_response()
}

async fn upload_attachment(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>, body: String) -> Response {
    if let Err(rejected) = authorize(&state, &headers) {
        return rejected;
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "id": 900,
            "visit_note": id,
            "has_file_field": body.contains("name=\"file\""),
        })),
    )
        .into_response()
}

async fn patient_history(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(rejected) = authorize(&state, &headers) {
        return rejected;
    }
    Json(json!({"patient": {"id": id}, "appointments": [], "visit_notes": []})).into_response()
}

async fn rooms(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(rejected) = authorize(&state, &headers) {
        return rejected;
    }
    Json(json!([{"id": 1, "name": "101"}, {"id": 2, "name": "102"}])).into_response()
}

async fn create_room(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(rejected) = authorize(&state, &headers) {
        return rejected;
    }
    (StatusCode::CREATED, Json(json!({"id": 3, "name": body["name"]}))).into_response()
}

async fn delete_room(State(state): State<Shared>, headers: HeaderMap, Path(_id): Path<i64>) -> Response {
    if let Err(rejected) = authorize(&state, &headers) {
        return rejected;
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn note_draft(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(rejected) = authorize(&state, &headers) {
        return rejected;
    }
    let bullets: Vec<String> = body["bullets"]
        .as_array()
        .map(|items| items.iter().filter_map(Value::as_str).map(|b| format!("- {b}")).collect())
        .unwrap_or_default();
    let title = match body["language"].as_str() {
        Some("ru") => "Черновик заметки визита",
        _ => "Visit note draft",
    };
    Json(json!({"draft": format!("{title}\n{}", bullets.join("\n"))})).into_response()
}

async fn patient_summary(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(rejected) = authorize(&state, &headers) {
        return rejected;
    }
    match body["patient_id"].as_i64() {
        Some(3) => Json(json!({
            "title": "Summary for Anna Smirnova",
            "items": [{"date": "2026-10-01", "appointment_id": 1, "snippet": "Follow-up in two weeks"}]
        }))
        .into_response(),
        _ => (StatusCode::FORBIDDEN, Json(json!({"detail": "You have no access to this patient."}))).into_response(),
    }
}
