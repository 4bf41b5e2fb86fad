// src/error.rs

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Every failure the classify/plan pipeline can surface to a caller.
#[derive(Error, Debug)]
pub enum IntentError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("classification failed: {0}")]
    Classification(String),

    #[error("invalid amount '{amount}': {reason}")]
    InvalidAmount { amount: String, reason: String },

    #[error("unknown token '{symbol}' on {family}")]
    UnknownToken { family: String, symbol: String },

    #[error("unknown recipient '{0}'")]
    UnknownRecipient(String),

    #[error("unsupported intent: {0}")]
    UnsupportedIntent(String),

    #[error("invalid intent: {0}")]
    InvalidIntent(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("upstream quote error {status}: {body}")]
    UpstreamQuote { status: u16, body: String },

    #[error("LLM provider error {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("no route returned by the swap aggregator")]
    NoRoute,

    #[error("malformed upstream response: {0}")]
    MalformedUpstream(String),

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Unreadable or mistyped request bodies are caller errors.
impl From<JsonRejection> for IntentError {
    fn from(rejection: JsonRejection) -> Self {
        IntentError::InvalidRequest(rejection.body_text())
    }
}

impl IntentError {
    pub fn invalid_amount(amount: &str, reason: impl Into<String>) -> Self {
        IntentError::InvalidAmount {
            amount: amount.to_string(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code for the error class.
    pub fn code(&self) -> &'static str {
        match self {
            IntentError::Configuration(_) => "CONFIGURATION_ERROR",
            IntentError::Classification(_) => "CLASSIFICATION_ERROR",
            IntentError::InvalidAmount { .. } => "INVALID_AMOUNT",
            IntentError::UnknownToken { .. } => "UNKNOWN_TOKEN",
            IntentError::UnknownRecipient(_) => "UNKNOWN_RECIPIENT",
            IntentError::UnsupportedIntent(_) => "UNSUPPORTED_INTENT",
            IntentError::InvalidIntent(_) => "INVALID_INTENT",
            IntentError::InvalidRequest(_) => "INVALID_REQUEST",
            IntentError::UpstreamQuote { .. } => "UPSTREAM_QUOTE_ERROR",
            IntentError::Provider { .. } => "PROVIDER_ERROR",
            IntentError::NoRoute => "NO_ROUTE",
            IntentError::MalformedUpstream(_) => "MALFORMED_UPSTREAM",
            IntentError::Transport(_) => "UPSTREAM_UNREACHABLE",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            IntentError::Configuration(_) | IntentError::Classification(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            IntentError::InvalidAmount { .. }
            | IntentError::UnknownToken { .. }
            | IntentError::UnknownRecipient(_)
            | IntentError::UnsupportedIntent(_)
            | IntentError::InvalidIntent(_)
            | IntentError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            IntentError::UpstreamQuote { status, .. } | IntentError::Provider { status, .. } => {
                relayed_status(*status)
            }
            IntentError::NoRoute => StatusCode::UNPROCESSABLE_ENTITY,
            IntentError::MalformedUpstream(_) => StatusCode::BAD_GATEWAY,
            IntentError::Transport(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            IntentError::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            IntentError::UpstreamQuote { status, body } | IntentError::Provider { status, body } => {
                Some(json!({ "status": status, "body": body }))
            }
            IntentError::UnknownToken { family, symbol } => {
                Some(json!({ "family": family, "symbol": symbol }))
            }
            _ => None,
        }
    }
}

// Upstream 4xx/5xx are passed through; anything else means the upstream
// answered but not usefully, which is a gateway problem from our side.
fn relayed_status(status: u16) -> StatusCode {
    match StatusCode::from_u16(status) {
        Ok(code) if code.is_client_error() || code.is_server_error() => code,
        _ => StatusCode::BAD_GATEWAY,
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<&IntentError> for ErrorResponse {
    fn from(err: &IntentError) -> Self {
        ErrorResponse {
            error: err.to_string(),
            code: err.code(),
            details: err.details(),
        }
    }
}

impl IntoResponse for IntentError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), status = %status, "{}", self);
        } else {
            tracing::warn!(code = self.code(), status = %status, "{}", self);
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
