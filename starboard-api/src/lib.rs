//! starboard-api library - Standings dashboard service
//!
//! Serves the ranked leaderboard standings as JSON and as a small HTML
//! dashboard, backed by the shared standings cache.

use std::sync::Arc;

use axum::Router;
use starboard_common::cache::StandingsCache;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Standings cache backing every endpoint
    pub cache: Arc<StandingsCache>,
}

impl AppState {
    /// Create new application state
    pub fn new(cache: Arc<StandingsCache>) -> Self {
        Self { cache }
    }
}

/// Build application router.
///
/// The dashboard historically lives on a different origin than the API,
/// hence the permissive CORS layer.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/standings", get(api::standings_current))
        .route("/standings/:year", get(api::standings_for_year))
        .route("/", get(api::serve_index))
        .route("/:year", get(api::serve_index_for_year))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
