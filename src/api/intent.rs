use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::{error::IntentError, intent::Intent, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyRequest {
    pub text: String,
    /// Supported-asset context for the model; `defaults` is the older name.
    #[serde(default, alias = "defaults")]
    pub available_assets: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub intent: Intent,
}

pub async fn classify_handler(
    State(state): State<AppState>,
    payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Json<ClassifyResponse>, IntentError> {
    let Json(request) = payload?;
    info!(chars = request.text.len(), "classify request");
    let intent = state
        .classify(&request.text, request.available_assets.as_ref())
        .await?;
    Ok(Json(ClassifyResponse { intent }))
}
