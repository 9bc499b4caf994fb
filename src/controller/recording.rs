//! Development controller that echoes and records every dispatch.
//!
//! Each terminal handler answers `200 {"handler": ..., "service": ...}`;
//! `refresh` records the request and passes it on. The log is bounded, so
//! the binary can run with it indefinitely.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::collections::VecDeque;
use tokio::sync::Mutex;

use super::{AuthController, Capability};
use crate::types::DispatchResponse;

/// Log size used by [`RecordingController::new`].
pub const DEFAULT_CAPACITY: usize = 256;

/// One recorded controller invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub capability: Capability,
    pub service: Option<String>,
    pub path: String,
    pub event: Option<serde_json::Value>,
}

pub struct RecordingController {
    log: Mutex<VecDeque<Dispatch>>,
    capacity: usize,
}

impl RecordingController {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            log: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Everything recorded so far, oldest first.
    pub async fn dispatches(&self) -> Vec<Dispatch> {
        self.log.lock().await.iter().cloned().collect()
    }

    /// Recorded terminal-handler calls, without `refresh` entries.
    pub async fn handled(&self) -> Vec<Dispatch> {
        self.log
            .lock()
            .await
            .iter()
            .filter(|d| d.capability != Capability::Refresh)
            .cloned()
            .collect()
    }

    async fn record(&self, dispatch: Dispatch) {
        tracing::debug!(
            handler = %dispatch.capability,
            service = dispatch.service.as_deref().unwrap_or("-"),
            path = %dispatch.path,
            "controller dispatch"
        );
        let mut log = self.log.lock().await;
        if log.len() == self.capacity {
            log.pop_front();
        }
        log.push_back(dispatch);
    }

    async fn answer(
        &self,
        capability: Capability,
        service: Option<String>,
        path: String,
        event: Option<serde_json::Value>,
    ) -> Response {
        self.record(Dispatch {
            capability,
            service: service.clone(),
            path,
            event,
        })
        .await;

        Json(DispatchResponse {
            handler: capability.as_str().into(),
            service,
        })
        .into_response()
    }
}

impl Default for RecordingController {
    fn default() -> Self {
        Self::new()
    }
}

fn path_of(req: &Request) -> String {
    req.uri().path().to_string()
}

impl AuthController for RecordingController {
    async fn callback(&self, req: Request) -> Response {
        self.answer(Capability::Callback, None, path_of(&req), None)
            .await
    }

    async fn login(&self, service: String, req: Request) -> Response {
        self.answer(Capability::Login, Some(service), path_of(&req), None)
            .await
    }

    async fn logout(&self, service: String, req: Request) -> Response {
        self.answer(Capability::Logout, Some(service), path_of(&req), None)
            .await
    }

    async fn is_logged_in_service(&self, service: String, req: Request) -> Response {
        self.answer(
            Capability::IsLoggedInService,
            Some(service),
            path_of(&req),
            None,
        )
        .await
    }

    async fn is_logged_in(&self, req: Request) -> Response {
        self.answer(Capability::IsLoggedIn, None, path_of(&req), None)
            .await
    }

    async fn logout_callback(&self, service: String, req: Request) -> Response {
        self.answer(
            Capability::LogoutCallback,
            Some(service),
            path_of(&req),
            None,
        )
        .await
    }

    async fn logged_out(
        &self,
        service: String,
        parts: Parts,
        event: serde_json::Value,
    ) -> Response {
        self.answer(
            Capability::LoggedOut,
            Some(service),
            parts.uri.path().to_string(),
            Some(event),
        )
        .await
    }

    async fn refresh(&self, req: Request, next: Next) -> Response {
        self.record(Dispatch {
            capability: Capability::Refresh,
            service: None,
            path: path_of(&req),
            event: None,
        })
        .await;
        next.run(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde_json::json;

    fn request(uri: &str) -> Request {
        axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_records_login_with_service() {
        let ctrl = RecordingController::new();
        let resp = ctrl.login("google".into(), request("/auth/login/google")).await;
        assert_eq!(resp.status(), axum::http::StatusCode::OK);

        let log = ctrl.handled().await;
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].capability, Capability::Login);
        assert_eq!(log[0].service.as_deref(), Some("google"));
        assert_eq!(log[0].path, "/auth/login/google");
    }

    #[tokio::test]
    async fn test_records_logged_out_event() {
        let ctrl = RecordingController::new();
        let (parts, _body) = request("/auth/event/loggedout/github").into_parts();
        ctrl.logged_out("github".into(), parts, json!({"sid": "abc"})).await;

        let log = ctrl.dispatches().await;
        assert_eq!(log[0].capability, Capability::LoggedOut);
        assert_eq!(log[0].path, "/auth/event/loggedout/github");
        assert_eq!(log[0].event, Some(json!({"sid": "abc"})));
    }

    #[tokio::test]
    async fn test_log_is_bounded() {
        let ctrl = RecordingController::with_capacity(2);
        ctrl.is_logged_in(request("/a")).await;
        ctrl.is_logged_in(request("/b")).await;
        ctrl.is_logged_in(request("/c")).await;

        let paths: Vec<String> = ctrl.dispatches().await.into_iter().map(|d| d.path).collect();
        assert_eq!(paths, vec!["/b", "/c"]);
    }

    #[tokio::test]
    async fn test_zero_capacity_keeps_latest() {
        let ctrl = RecordingController::with_capacity(0);
        ctrl.callback(request("/x")).await;
        ctrl.callback(request("/y")).await;
        let log = ctrl.dispatches().await;
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].path, "/y");
    }
}
