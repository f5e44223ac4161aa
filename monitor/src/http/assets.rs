//! Static asset serving for the dashboard.

use axum::response::{Html, IntoResponse};

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Serves the single-page dashboard. It polls `/api/status` on its own.
pub(crate) async fn serve_ui() -> impl IntoResponse {
    Html(INDEX_HTML)
}
