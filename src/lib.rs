//! Auth Router: mounts login, logout, callback and session-status
//! endpoints for a pluggable auth controller.
//!
//! The route table is built once at startup from a [`Config`] and a
//! controller's handlers, then composed onto an Axum application together
//! with the controller's global `refresh` middleware.

pub mod audit;
pub mod config;
pub mod controller;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod types;

use axum::Router;
use axum::http::{HeaderValue, Uri};
use axum::routing::get;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::AppError;
use crate::routes::AuthRoutes;

/// Shared application state available to the service routes.
pub struct AppState {
    pub config: Config,
    pub route_count: usize,
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

fn cors_layer(config: &Config) -> Option<CorsLayer> {
    let origin: HeaderValue = config.frontend_url.as_deref()?.parse().ok()?;

    // CORS: allow single frontend origin with credentials
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::exact(origin))
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([axum::http::header::CONTENT_TYPE])
            .allow_credentials(true),
    )
}

/// Build the Axum application: health check, JSON 404 fallback, the auth
/// routes and their global middleware, then CORS and request tracing.
pub fn create_app(config: Config, auth_routes: AuthRoutes) -> Router {
    let state = Arc::new(AppState {
        route_count: auth_routes.bindings().len(),
        config,
    });

    let base = Router::new()
        .route("/health", get(routes::health::health))
        .fallback(not_found)
        .with_state(state.clone());

    // The fallback is already in place, so `refresh` covers unmatched paths too.
    let mut app = auth_routes.attach(base);

    if let Some(cors) = cors_layer(&state.config) {
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_cors_without_frontend_url() {
        assert!(cors_layer(&Config::test_default()).is_none());
    }

    #[test]
    fn test_cors_with_frontend_url() {
        let config = Config {
            frontend_url: Some("http://localhost:3000".into()),
            ..Config::test_default()
        };
        assert!(cors_layer(&config).is_some());
    }
}
