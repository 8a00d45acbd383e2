//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/readyz`  : readiness (503 when draining)
//! - `/metrics` : text exposition of the registry
//!
//! None of these touch the request counter.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use hitcount_core::encode;

use crate::app_state::AppState;

pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    if state.is_draining() {
        (StatusCode::SERVICE_UNAVAILABLE, "draining")
    } else {
        (StatusCode::OK, "ready")
    }
}

/// Encode the whole snapshot into one buffer, then answer. A bad identifier
/// yields 500 instead of a body scrapers cannot parse.
pub async fn metrics(State(state): State<AppState>) -> Response {
    let snapshot = state.registry().snapshot();
    match encode(&snapshot) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, metrics = snapshot.len(), "metrics exposition failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
                format!("exposition failed: {e}\n"),
            )
                .into_response()
        }
    }
}
