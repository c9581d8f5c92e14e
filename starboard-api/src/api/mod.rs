//! HTTP API for the standings dashboard

mod health;
mod standings;
mod ui;

pub use health::{health_check, health_routes, HealthResponse};
pub use standings::{standings_current, standings_for_year, StandingsQuery};
pub use ui::{serve_app_js, serve_index, serve_index_for_year};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use starboard_common::Error;

/// Error wrapper mapping engine failures onto HTTP responses.
///
/// Fetch, cache-IO and malformed-data failures all surface as a server
/// error with a human-readable message; no partial or degraded standings
/// are synthesized.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);

        let body = Json(json!({
            "error": self.0.to_string(),
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
