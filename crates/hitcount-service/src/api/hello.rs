//! `GET /hello?name=<string>`

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use hitcount_core::HitcountError;

use crate::app_state::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct HelloQuery {
    #[serde(default)]
    pub name: Option<String>,
}

fn greeting_json(name: &str) -> Value {
    json!({ "greeting": format!("Hello, {name}!") })
}

/// Rejected queries answer 400 in the JSON error shape and are not counted.
pub async fn hello(
    State(state): State<AppState>,
    query: Result<Query<HelloQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(q) = query.map_err(|e| HitcountError::BadRequest(e.body_text()))?;

    state.requests().inc()?;

    let name = q
        .name
        .as_deref()
        .unwrap_or(state.cfg().hello.default_name.as_str());
    tracing::debug!(%name, "hello");

    Ok(Json(greeting_json(name)))
}
