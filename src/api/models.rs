//! Wire types shared by the API method sets.
//!
//! Domain records the screens only display are kept as `serde_json::Value`;
//! the types here are the ones the client itself reasons about.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::error::ApiError;

/// User role; decides which half of the API a user may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Doctor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Doctor => "DOCTOR",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoctorProfile {
    pub full_name: String,
    pub specialization: String,
    pub phone: String,
    pub room: String,
}

/// The signed-in user as returned by `/me/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub doctor_profile: Option<DoctorProfile>,
}

impl User {
    /// First and last name, or the email when both are blank.
    pub fn full_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Scheduled and confirmed appointments still occupy their slot.
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::Confirmed)
    }
}

/// Records that expose a numeric primary key.
pub trait HasId {
    fn id(&self) -> Option<i64>;
}

impl HasId for Value {
    fn id(&self) -> Option<i64> {
        self.get("id").and_then(Value::as_i64)
    }
}

impl HasId for User {
    fn id(&self) -> Option<i64> {
        Some(self.id)
    }
}

/// A related record: either its bare id or the embedded object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Id(i64),
    Object(T),
}

impl<T: HasId> Ref<T> {
    pub fn id(&self) -> Option<i64> {
        match self {
            Ref::Id(id) => Some(*id),
            Ref::Object(obj) => obj.id(),
        }
    }
}

impl<T> Ref<T> {
    pub fn object(&self) -> Option<&T> {
        match self {
            Ref::Id(_) => None,
            Ref::Object(obj) => Some(obj),
        }
    }
}

/// A list endpoint body: a bare array or a page envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Paginated<T> {
    List(Vec<T>),
    Page {
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        #[serde(default = "Vec::new")]
        results: Vec<T>,
    },
}

/// A list result with its total count.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub count: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            count: 0,
        }
    }
}

impl<T> Paginated<T> {
    pub fn into_page(self) -> Page<T> {
        match self {
            Paginated::List(items) => Page {
                count: items.len() as u64,
                items,
            },
            Paginated::Page { count, results, .. } => Page {
                count: count.unwrap_or(results.len() as u64),
                items: results,
            },
        }
    }
}

impl<T: serde::de::DeserializeOwned> Page<T> {
    /// Decode any list body; `null` yields an empty page.
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        if value.is_null() {
            return Ok(Page::default());
        }
        serde_json::from_value::<Paginated<T>>(value)
            .map(Paginated::into_page)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPatient {
    pub id: i64,
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchService {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub duration_minutes: u32,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchAppointment {
    pub id: i64,
    pub start_at: String,
    pub end_at: String,
    pub status: AppointmentStatus,
    pub patient_id: i64,
    pub patient_name: String,
    pub doctor_email: String,
    pub service_code: String,
}

/// Global search results; sections the server omits are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResults {
    pub patients: Vec<SearchPatient>,
    pub services: Vec<SearchService>,
    pub appointments: Vec<SearchAppointment>,
}
