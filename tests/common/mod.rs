//! Test utilities: app builders around the recording controller, request
//! helpers, an order-recording cache guard and an audit event collector.

#![allow(dead_code)]

use auth_router::config::Config;
use auth_router::controller::recording::RecordingController;
use auth_router::controller::{HandlerTableBuilder, MiddlewareHandler, middleware_handler};
use auth_router::create_app;
use auth_router::routes::build_routes;
use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

/// Build the full app over a recording controller mounted at `base_path`.
pub fn build_test_app(base_path: &str) -> (axum::Router, Arc<RecordingController>) {
    let config = Config::with_base_path(base_path).expect("valid base path");
    let controller = Arc::new(RecordingController::new());
    let routes = build_routes(&config, HandlerTableBuilder::from_controller(controller.clone()))
        .expect("complete controller");
    (create_app(config, routes), controller)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Helper to read response body as JSON.
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub async fn body_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

/// Shared, ordered log of events written by test doubles.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Cache guard double: logs `guard <path>` and passes the request on.
pub fn recording_guard(log: EventLog) -> MiddlewareHandler {
    middleware_handler(move |req: Request<Body>, next: Next| {
        let log = log.clone();
        async move {
            log.lock()
                .unwrap()
                .push(format!("guard {}", req.uri().path()));
            next.run(req).await
        }
    })
}

/// Audit events captured from the `audit` tracing target, parsed as JSON.
pub type AuditLog = Arc<Mutex<Vec<serde_json::Value>>>;

struct AuditCollector(AuditLog);

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for AuditCollector {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target() != "audit" {
            return;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let parsed = serde_json::from_str(&visitor.0).expect("audit event is JSON");
        self.0.lock().unwrap().push(parsed);
    }
}

/// Collect audit events on this thread until the guard drops.
///
/// `#[tokio::test]` runs on a current-thread runtime, so every middleware
/// of a `oneshot` call reports to this subscriber.
pub fn capture_audit() -> (AuditLog, DefaultGuard) {
    let log: AuditLog = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(AuditCollector(log.clone()));
    (log, tracing::subscriber::set_default(subscriber))
}
