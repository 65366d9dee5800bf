//! `hvlink mock-hv` -- a stand-in for the Heroes' Veritas session API.
//!
//! Serves a fixed set of sessions generated at startup (two completed, one
//! in progress) so the connector can be exercised end to end.
//!
//! Endpoints:
//! - GET /api/sessions        - All sessions
//! - GET /api/sessions/{id}   - One session, 404 when unknown
//! - GET /api/health          - Liveness
//!
//! All responses use the `{status, data}` / `{status, message}` envelope.

mod fixtures;
mod handlers;

use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::{self as axum_middleware, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;

use self::handlers::{handle_get_session, handle_health, handle_list_sessions, handle_not_found};

/// Shared, read-only server state.
pub(crate) struct MockState {
    pub(crate) sessions: Vec<serde_json::Value>,
}

pub(crate) fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/sessions", get(handle_list_sessions))
        .route("/api/sessions/{id}", get(handle_get_session))
        .route("/api/health", get(handle_health))
        .fallback(handle_not_found)
        .layer(axum_middleware::from_fn(log_request))
        .with_state(state)
}

/// Start the mock server on `port` and serve until Ctrl+C.
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let sessions = fixtures::generate_sessions();
    let completed = sessions
        .iter()
        .filter(|s| s["state"] == "completed")
        .count();
    let in_progress = sessions
        .iter()
        .filter(|s| s["state"] == "in_progress")
        .count();

    let app = router(Arc::new(MockState { sessions }));

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        completed,
        in_progress,
        "Heroes' Veritas mock API serving on http://localhost:{}",
        port
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("mock HV shut down");
    Ok(())
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    tracing::info!(%method, %path, status = response.status().as_u16(), "[HV]");
    response
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}
