//! Route handlers for the mock HV API.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use super::MockState;

fn json_error(status: StatusCode, message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(json!({"status": "error", "message": message})))
}

/// GET /api/sessions
pub(crate) async fn handle_list_sessions(State(state): State<Arc<MockState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({"status": "ok", "data": state.sessions})),
    )
}

/// GET /api/sessions/{id}
pub(crate) async fn handle_get_session(
    State(state): State<Arc<MockState>>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state
        .sessions
        .iter()
        .find(|s| s["session_id"] == session_id.as_str())
    {
        Some(session) => (StatusCode::OK, Json(json!({"status": "ok", "data": session}))),
        None => json_error(StatusCode::NOT_FOUND, "Session not found"),
    }
}

/// GET /api/health
pub(crate) async fn handle_health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "data": {"service": "heroes-veritas-mock", "healthy": true}
        })),
    )
}

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found(uri: Uri) -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, &format!("Not found: {}", uri.path()))
}
