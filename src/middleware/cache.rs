//! Browser cache prevention for auth responses.
//!
//! Auth redirects and session-status answers must never be served from a
//! browser or proxy cache. Headers the handler set itself are left alone.

use axum::extract::Request;
use axum::http::header::{CACHE_CONTROL, EXPIRES, PRAGMA};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

use crate::controller::{MiddlewareHandler, middleware_handler};

pub const CACHE_CONTROL_VALUE: &str = "private, no-cache, no-store, must-revalidate";

/// Axum middleware that disables client and proxy caching. Never
/// short-circuits: the request always reaches `next`.
pub async fn prevent_browser_cache(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    let headers = response.headers_mut();
    headers
        .entry(CACHE_CONTROL)
        .or_insert(HeaderValue::from_static(CACHE_CONTROL_VALUE));
    headers
        .entry(EXPIRES)
        .or_insert(HeaderValue::from_static("-1"));
    headers
        .entry(PRAGMA)
        .or_insert(HeaderValue::from_static("no-cache"));

    response
}

/// The default pre-handler for guarded auth routes.
pub fn cache_guard() -> MiddlewareHandler {
    middleware_handler(prevent_browser_cache)
}
