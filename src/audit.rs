//! OCSF-shaped audit events for auth route dispatches.
//!
//! One Authentication (3001) event per dispatched auth route, emitted via
//! `tracing::info!` on the `audit` target as structured JSON. Never panics.

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::controller::Capability;

// OCSF event class UIDs
pub const CLASS_AUTHENTICATION: u32 = 3001;

// Activity IDs
pub const ACTIVITY_LOGON: u32 = 1;
pub const ACTIVITY_LOGOFF: u32 = 2;
pub const ACTIVITY_AUTH_TICKET: u32 = 3; // OAuth callback
pub const ACTIVITY_OTHER: u32 = 99; // Status checks

// Status IDs
pub const STATUS_SUCCESS: u32 = 1;
pub const STATUS_FAILURE: u32 = 2;

// Severity IDs
pub const SEVERITY_INFORMATIONAL: u32 = 1;
pub const SEVERITY_LOW: u32 = 2;
pub const SEVERITY_MEDIUM: u32 = 3;

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// OCSF activity for a capability.
pub fn activity_for(capability: Capability) -> (u32, &'static str) {
    match capability {
        Capability::Login => (ACTIVITY_LOGON, "Logon"),
        Capability::Logout | Capability::LogoutCallback | Capability::LoggedOut => {
            (ACTIVITY_LOGOFF, "Logoff")
        }
        Capability::Callback => (ACTIVITY_AUTH_TICKET, "Authentication Ticket"),
        // `refresh` is global middleware and never dispatched as a route.
        Capability::IsLoggedIn | Capability::IsLoggedInService | Capability::Refresh => {
            (ACTIVITY_OTHER, "Other")
        }
    }
}

/// Status and severity derived from the response status code.
pub fn outcome_for(status: StatusCode) -> (u32, u32) {
    if status.is_server_error() {
        (STATUS_FAILURE, SEVERITY_MEDIUM)
    } else if status.is_client_error() {
        (STATUS_FAILURE, SEVERITY_LOW)
    } else {
        (STATUS_SUCCESS, SEVERITY_INFORMATIONAL)
    }
}

fn severity_name(id: u32) -> &'static str {
    match id {
        SEVERITY_INFORMATIONAL => "Informational",
        SEVERITY_LOW => "Low",
        SEVERITY_MEDIUM => "Medium",
        _ => "Unknown",
    }
}

fn status_name(id: u32) -> &'static str {
    match id {
        STATUS_SUCCESS => "Success",
        _ => "Failure",
    }
}

/// Build the event body for one dispatch.
pub fn route_event(
    capability: Capability,
    method: &Method,
    path: &str,
    status: StatusCode,
) -> serde_json::Value {
    let (activity_id, activity_name) = activity_for(capability);
    let (status_id, severity_id) = outcome_for(status);

    json!({
        "class_uid": CLASS_AUTHENTICATION,
        "class_name": "Authentication",
        "activity_id": activity_id,
        "activity_name": activity_name,
        "severity_id": severity_id,
        "severity": severity_name(severity_id),
        "status_id": status_id,
        "status": status_name(status_id),
        "time": now_millis(),
        "metadata": {
            "product": {
                "name": "auth-router",
                "version": env!("CARGO_PKG_VERSION"),
            }
        },
        "http_request": {
            "http_method": method.as_str(),
            "url": { "path": path },
        },
        "http_response": { "code": status.as_u16() },
        "message": format!("{} dispatched", capability),
    })
}

fn emit(event: &serde_json::Value) {
    if let Ok(json) = serde_json::to_string(event) {
        tracing::info!(target: "audit", "{}", json);
    }
}

/// Route middleware: run the route, then emit one event for the outcome.
pub async fn audit_dispatch(capability: Capability, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    emit(&route_event(capability, &method, &path, response.status()));
    response
}
