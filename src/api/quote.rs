use axum::{
    extract::{rejection::JsonRejection, RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use ethers::types::U256;

use crate::{
    blockchain::{
        models::{EvmQuoteRequest, EvmQuoteResponse},
        services::{token::parse_address, UpstreamReply},
    },
    error::IntentError,
    AppState,
};

pub async fn evm_quote_handler(
    State(state): State<AppState>,
    payload: Result<Json<EvmQuoteRequest>, JsonRejection>,
) -> Result<Json<EvmQuoteResponse>, IntentError> {
    let Json(request) = payload?;
    let router = parse_address(&request.router, "router")?;
    let amount_in = U256::from_dec_str(request.amount_in_wei.trim()).map_err(|_| {
        IntentError::InvalidRequest(format!(
            "amountInWei '{}' is not a decimal integer",
            request.amount_in_wei
        ))
    })?;
    let path = request
        .path
        .iter()
        .map(|hop| parse_address(hop, "path hop"))
        .collect::<Result<Vec<_>, _>>()?;

    let amounts = state
        .evm_quoter
        .amounts_out(&request.rpc_url, router, amount_in, &path)
        .await?;
    Ok(Json(EvmQuoteResponse {
        amounts: amounts.iter().map(U256::to_string).collect(),
    }))
}

pub async fn jupiter_quote_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response, IntentError> {
    let reply = state
        .jupiter
        .forward_quote(query.as_deref().unwrap_or(""))
        .await?;
    Ok(relay(reply))
}

pub async fn jupiter_swap_handler(
    State(state): State<AppState>,
    body: String,
) -> Result<Response, IntentError> {
    let reply = state.jupiter.forward_swap(body).await?;
    Ok(relay(reply))
}

fn relay(reply: UpstreamReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, [(header::CONTENT_TYPE, "application/json")], reply.body).into_response()
}
