//! Shared response DTOs.

use serde::Serialize;

/// GET /health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub base_path: String,
    pub routes: usize,
}

/// Body returned by the recording controller for every terminal handler.
#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub handler: String,
    pub service: Option<String>,
}
