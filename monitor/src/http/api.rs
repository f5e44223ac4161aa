//! JSON API consumed by the dashboard.

use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
};

use crate::http::AppState;

pub(crate) fn routes() -> Router<AppState> {
    Router::new().route("/status", get(get_status))
}

/// Returns every record keyed by address, e.g.
/// `{"10.0.0.1": {"IP": "10.0.0.1", "Hostname": "nas", "Reachable": true, "LastSeen": "..."}}`.
#[axum::debug_handler]
async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "no-store")],
        Json(state.store.snapshot()),
    )
}
