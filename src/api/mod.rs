//! # API Module
//!
//! HTTP handlers for the intent planner. Everything is mounted under `/api`.
//!
//! ## Available Endpoints
//!
//! ### Intents
//! - `POST /intent` - Classify free text into a typed intent
//! - `POST /plan` - Build an unsigned plan for an intent
//! - `POST /chat` - Classify then plan in one call
//!
//! ### Quotes
//! - `POST /evm/quote` - Router `getAmountsOut` through a caller-chosen RPC
//! - `GET /jupiter/quote` - Raw aggregator quote proxy
//! - `POST /jupiter/swap` - Raw aggregator swap-build proxy
//!
//! ### Misc
//! - `GET /health`, `GET /assets`, `POST /rpc` (JSON-RPC tool calls)

pub mod assets;
pub mod chat;
pub mod health;
pub mod intent;
pub mod plan;
pub mod quote;
pub mod rpc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

/// The full application: API routes under `/api` with tracing and CORS.
pub fn create_router(state: AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(health::health_handler))
        .route("/assets", get(assets::assets_handler))
        // Intent pipeline
        .route("/intent", post(intent::classify_handler))
        .route("/plan", post(plan::plan_handler))
        .route("/chat", post(chat::chat_handler))
        // Quote providers
        .route("/evm/quote", post(quote::evm_quote_handler))
        .route("/jupiter/quote", get(quote::jupiter_quote_handler))
        .route("/jupiter/swap", post(quote::jupiter_swap_handler))
        // JSON-RPC endpoint for MCP tool calls
        .route("/rpc", post(rpc::rpc_handler));

    Router::new()
        .nest("/api", api_router)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
