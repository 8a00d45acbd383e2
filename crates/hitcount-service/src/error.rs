//! HTTP mapping of core errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use hitcount_core::error::{ClientCode, HitcountError};

/// Handler error: a core error rendered as `{"code": .., "msg": ..}`.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub HitcountError);

pub fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::BadRequest | ClientCode::UnsupportedVersion => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = status_for(code);
        if status.is_server_error() {
            tracing::error!(code = code.as_str(), error = %self.0, "request failed");
        }
        let body = json!({
            "code": code.as_str(),
            "msg": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
