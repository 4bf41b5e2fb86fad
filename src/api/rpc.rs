use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;

use crate::{
    mcp::{
        handler::handle_mcp_request,
        protocol::{error_codes, Request, Response},
    },
    AppState,
};

// Forward JSON-RPC requests over HTTP to the MCP handler
pub async fn rpc_handler(
    State(state): State<AppState>,
    payload: Result<Json<Request>, JsonRejection>,
) -> Json<Response> {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return Json(Response::error(
                Value::Null,
                error_codes::PARSE_ERROR,
                format!("Parse error: {}", rejection.body_text()),
            ))
        }
    };
    match handle_mcp_request(req, state).await {
        Some(resp) => Json(resp),
        None => Json(Response::error(
            Value::Null,
            error_codes::INVALID_REQUEST,
            "Notifications are not supported over HTTP",
        )),
    }
}
