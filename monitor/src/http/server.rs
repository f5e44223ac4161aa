//! Router assembly and server startup for the dashboard.

use core::{net::SocketAddr, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{HeaderName, HeaderValue, Request, StatusCode},
    middleware::{self as ax_middleware, Next},
    response::{Redirect, Response},
    routing::get,
};
use eyre::WrapErr as _;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::{
    http::{api, assets},
    run::shutdown_signal,
    store::StatusStore,
};

/// State shared by the request handlers. Handlers only ever read from it.
#[derive(Clone)]
pub struct AppState {
    pub store: StatusStore,
}

/// Sets conservative headers on all responses.
async fn secure_headers_middleware(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );
    response
}

/// Builds the router: `/` for the dashboard, `/api/status` for the data, everything else redirects to `/`.
pub fn create_app(app_state: AppState) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(ax_middleware::from_fn(secure_headers_middleware));

    Router::new()
        .route("/", get(assets::serve_ui))
        .nest("/api", api::routes())
        .with_state(app_state)
        .fallback(|req: Request<Body>| async move {
            warn!(method = %req.method(), uri = %req.uri(), "Unhandled request");
            Redirect::permanent("/")
        })
        .layer(middleware_stack)
}

/// Serves the dashboard on `addr` until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, store: StatusStore) -> eyre::Result<()> {
    let app = create_app(AppState { store });

    let listener = TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("failed to bind {addr}"))?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("HTTP server failed")
}
