use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    blockchain::{
        models::{PlanConfig, PlanOutcome},
        AddressBook, TokenRegistry,
    },
    error::IntentError,
    intent::Intent,
    AppState,
};

/// `intent` stays raw so a bad `type` can be reported as unsupported
/// rather than as a body rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub intent: Value,
    #[serde(default)]
    pub registry: Option<TokenRegistry>,
    #[serde(default)]
    pub address_book: Option<AddressBook>,
    #[serde(default)]
    pub config: Option<PlanConfig>,
}

pub async fn plan_handler(
    State(state): State<AppState>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<PlanOutcome>, IntentError> {
    let Json(request) = payload?;
    let intent = Intent::from_value(request.intent)?;
    if let Some(registry) = &request.registry {
        registry
            .validate()
            .map_err(|e| IntentError::InvalidRequest(e.to_string()))?;
    }
    let outcome = state
        .plan(
            &intent,
            request.registry.as_ref(),
            request.address_book.as_ref(),
            request.config.as_ref(),
        )
        .await?;
    Ok(Json(outcome))
}
