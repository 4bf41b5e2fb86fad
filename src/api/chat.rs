use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{blockchain::models::PlanOutcome, error::IntentError, intent::Intent, AppState};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub intent: Intent,
    pub result: PlanOutcome,
}

/// One user message: classify, then plan against the process defaults.
pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, IntentError> {
    let Json(request) = payload?;
    let intent = state.classify(&request.text, None).await?;
    info!(kind = intent.kind(), "chat message classified");
    let result = state.plan(&intent, None, None, None).await?;
    Ok(Json(ChatResponse { intent, result }))
}
