use axum::{extract::State, Json};
use serde_json::Value;

use crate::AppState;

/// Supported tokens per chain family plus the known recipient aliases.
pub async fn assets_handler(State(state): State<AppState>) -> Json<Value> {
    Json(state.assets_overview())
}
