//! Dashboard serving routes
//!
//! Serves the static HTML/JS dashboard; the page fetches the JSON
//! standings endpoint for the year in its path and renders the table
//! client-side.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

const INDEX_HTML: &str = include_str!("../ui/index.html");
const APP_JS: &str = include_str!("../ui/app.js");

/// GET /
///
/// Serves the dashboard for the current contest year
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /:year
///
/// Same page; the script reads the year from the location path
pub async fn serve_index_for_year(Path(_year): Path<i32>) -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /static/app.js
pub async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/javascript")],
        APP_JS,
    )
        .into_response()
}
