//! Error types: startup faults and HTTP error responses.
//!
//! `RouteError` aborts route-table construction. `AppError` maps to a
//! status + JSON body for the few responses this crate produces itself;
//! everything else comes from the controller untouched.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::controller::Capability;

/// Fault raised while building the route table.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("controller is missing required capability `{0}`")]
    MissingCapability(Capability),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid logged-out event: {message}")]
    InvalidEvent { status: StatusCode, message: String },
}

impl AppError {
    fn parts(&self) -> (StatusCode, serde_json::Value) {
        match self {
            AppError::NotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Not found", "path": path}),
            ),
            AppError::InvalidEvent { status, message } => (
                *status,
                json!({"error": "Invalid logged-out event", "message": message}),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found() {
        let (status, body) = AppError::NotFound("/nope".into()).parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found");
        assert_eq!(body["path"], "/nope");
    }

    #[test]
    fn test_invalid_event_keeps_rejection_status() {
        let err = AppError::InvalidEvent {
            status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
            message: "Expected request with `Content-Type: application/json`".into(),
        };
        let (status, body) = err.parts();
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"], "Invalid logged-out event");
        assert!(body["message"].as_str().unwrap().contains("Content-Type"));
    }

    #[test]
    fn test_into_response_status() {
        let resp = AppError::NotFound("/x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_missing_capability_message() {
        let err = RouteError::MissingCapability(Capability::LoggedOut);
        assert_eq!(
            err.to_string(),
            "controller is missing required capability `loggedout`"
        );
    }
}
