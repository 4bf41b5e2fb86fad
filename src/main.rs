// src/main.rs

use intent_planner::{api::create_router, config::Config, mcp, AppState};
use std::env;
use std::net::SocketAddr;
use tokio::io;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn run_http_server(state: AppState) {
    let addr = SocketAddr::from(([127, 0, 0, 1], state.config.port));
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("❌ Failed to bind {}: {}", addr, e);
            return;
        }
    };
    info!("🚀 HTTP Server listening on {}", addr);
    if let Err(e) = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await {
        error!("HTTP server stopped: {}", e);
    }
}

async fn run_mcp_server(state: AppState) {
    info!("🚀 Starting MCP server on stdin/stdout...");
    let stdin = io::BufReader::new(io::stdin());
    if let Err(e) = mcp::stdio::serve(state, stdin, io::stdout()).await {
        error!("MCP transport failed: {}", e);
    }
    info!("MCP server shutting down");
}

#[tokio::main]
async fn main() {
    // stderr only: stdout carries MCP frames
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intent_planner=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Failed to load configuration: {:#}", e);
            return;
        }
    };

    match &config.llm {
        Some(llm) => info!(provider = %llm.provider, model = %llm.model, "LLM classifier configured"),
        None => info!("No LLM classifier configured; /intent and /chat will fail until a key is set"),
    }

    let state = match AppState::from_config(config) {
        Ok(state) => state,
        Err(e) => {
            error!("❌ Failed to initialize application state: {:#}", e);
            return;
        }
    };

    let mcp_mode = env::args().any(|a| a == "--mcp") || env::var("MCP_MODE").is_ok();
    if mcp_mode {
        run_mcp_server(state).await;
    } else {
        run_http_server(state).await;
    }
}
