//! Local dev server.
//!
//! Mounts the auth routes backed by the recording controller, which answers
//! every handler with a JSON echo. Useful for checking which handler a URL
//! reaches before wiring a real controller in.

use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

use auth_router::config::Config;
use auth_router::controller::HandlerTableBuilder;
use auth_router::controller::recording::RecordingController;
use auth_router::create_app;
use auth_router::routes::build_routes;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env for local dev
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    // Init tracing: JSON when asked for, pretty otherwise
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }

    let controller = Arc::new(RecordingController::new());
    let auth_routes = build_routes(&config, HandlerTableBuilder::from_controller(controller))?;

    for binding in auth_routes.bindings() {
        tracing::info!(route = %binding, "auth route");
    }
    tracing::info!(
        middleware = %auth_routes.global().capability(),
        "global middleware"
    );

    let addr = format!("0.0.0.0:{}", config.port);
    let app = create_app(config, auth_routes);

    tracing::info!("Starting local server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
