//! Metrics collection.
//!
//! # Metrics
//! - `crm_client_requests_total` (counter): settled requests by method, status
//! - `crm_client_transport_errors_total` (counter): requests with no response, by kind
//! - `crm_client_token_refresh_total` (counter): refresh calls by outcome
//! - `crm_client_refresh_waiters` (gauge): callers queued behind an in-flight refresh
//!
//! Only the `metrics` facade is used; the embedding application installs
//! whatever recorder it wants.

use metrics::{counter, gauge};

/// Record a request that received an HTTP response.
pub fn record_request(method: &str, status: u16) {
    counter!(
        "crm_client_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a request that failed before any response arrived.
pub fn record_transport_error(kind: &'static str) {
    counter!("crm_client_transport_errors_total", "kind" => kind).increment(1);
}

/// Record a settled refresh call ("success" or "failure").
pub fn record_refresh(outcome: &'static str) {
    counter!("crm_client_token_refresh_total", "outcome" => outcome).increment(1);
}

/// Update the number of callers waiting on a refresh.
pub fn record_refresh_waiters(count: usize) {
    gauge!("crm_client_refresh_waiters").set(count as f64);
}
