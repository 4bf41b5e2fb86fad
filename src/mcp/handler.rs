//! # MCP Handler Module
//!
//! Model Context Protocol dispatcher for the intent planner. It serves
//! stdio MCP mode and the HTTP `/rpc` route with the same logic.
//!
//! ## Supported Tools
//!
//! - `classify_intent` - Free text to a typed intent
//! - `plan_intent` - Unsigned plan (or prediction) for an intent
//! - `chat` - Classify then plan in one call
//! - `evm_quote` - Router `getAmountsOut` for a path
//! - `list_supported_assets` - Registry tokens and address-book aliases

use ethers::types::U256;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{
    blockchain::{
        models::{PlanConfig, PlanOutcome},
        services::token::parse_address,
        AddressBook, TokenRegistry,
    },
    error::IntentError,
    intent::Intent,
    mcp::protocol::{error_codes, Request, Response},
    utils, AppState,
};

const TOOL_NAMES: &[&str] = &[
    "classify_intent",
    "plan_intent",
    "chat",
    "evm_quote",
    "list_supported_assets",
];

// Helper: produce a result Value that always contains a text content array
// and preserves structured data for JSON-friendly clients.
fn make_texty_result(text: String, payload: Value) -> Value {
    let content = json!([{ "type": "text", "text": text }]);
    match payload {
        Value::Object(mut map) => {
            if !map.contains_key("content") {
                map.insert("content".into(), content);
            }
            Value::Object(map)
        }
        other => json!({
            "data": other,
            "content": content
        }),
    }
}

/// One-line human summary of a plan, for text-only MCP clients.
fn summarize_outcome(outcome: &PlanOutcome) -> String {
    match outcome {
        PlanOutcome::Prediction { predictions, .. } => {
            let parts: Vec<String> = predictions
                .iter()
                .map(|p| format!("{} {:+.2}% -> ${:.2}", p.token, p.pct, p.target))
                .collect();
            format!("Toy forecast: {}", parts.join(", "))
        }
        PlanOutcome::EvmTransfer { unsigned } => format!(
            "{} on chain {} to {}",
            unsigned.preview, unsigned.payload.chain_id, unsigned.payload.to
        ),
        PlanOutcome::EvmSwap { quote, unsigned } => format!(
            "{} via {}: out {} (min {}, {} bps)",
            unsigned.preview, unsigned.payload.to, quote.amount_out, quote.min_out, quote.slippage_bps
        ),
        PlanOutcome::SolanaTransfer { plan } => format!(
            "Solana transfer of {} {} to {}",
            plan.amount, plan.token.symbol, plan.to
        ),
        PlanOutcome::SolanaSwap { .. } => "Solana swap route selected".to_string(),
    }
}

fn to_value<T: serde::Serialize>(req_id: &Value, v: &T) -> Result<Value, Response> {
    serde_json::to_value(v).map_err(|e| {
        Response::error(req_id.clone(), error_codes::INTERNAL_ERROR, e.to_string())
    })
}

/// This is the main dispatcher for all incoming MCP requests.
pub async fn handle_mcp_request(req: Request, state: AppState) -> Option<Response> {
    info!("Handling MCP request for method: {}", req.method);

    if req.is_notification() {
        return None;
    }

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(&req),
        "tools/list" => handle_tools_list(&req),
        "tools/call" => handle_tool_call(req, state).await,
        // Convenience aliases to support direct method calls from CLI
        // They are rewritten into tools/call internally to reuse the same logic
        name if TOOL_NAMES.contains(&name) => {
            let wrapped = Request::new(
                req.id.clone(),
                "tools/call",
                Some(json!({
                    "name": name,
                    "arguments": req.params.clone().unwrap_or_else(|| json!({}))
                })),
            );
            handle_tool_call(wrapped, state).await
        }
        _ => Response::error(
            req.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    };

    Some(response)
}

/// Handles a 'tools/call' request by dispatching it to the correct tool logic.
async fn handle_tool_call(req: Request, state: AppState) -> Response {
    let params = match req.params.as_ref() {
        Some(p) => p,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'params' object",
            )
        }
    };

    let tool_name = match params.get("name").and_then(|n| n.as_str()) {
        Some(name) => name,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'name' field in params",
            )
        }
    };

    let empty_args = json!({});
    let args = params.get("arguments").unwrap_or(&empty_args);
    let req_id = &req.id;

    let res: Result<Response, Response> = match tool_name {
        "classify_intent" => classify_intent_tool(&state, args, req_id).await,
        "plan_intent" => plan_intent_tool(&state, args, req_id).await,
        "chat" => chat_tool(&state, args, req_id).await,
        "evm_quote" => evm_quote_tool(&state, args, req_id).await,
        "list_supported_assets" => {
            let assets = state.assets_overview();
            let summary = format!(
                "{} EVM and {} Solana tokens, {} address-book aliases",
                state.registry.evm.len(),
                state.registry.solana.len(),
                state.address_book.aliases().len()
            );
            Ok(Response::success(req_id.clone(), make_texty_result(summary, assets)))
        }
        _ => Err(Response::error(
            req_id.clone(),
            error_codes::METHOD_NOT_FOUND,
            format!("Tool not found: {}", tool_name),
        )),
    };

    if let Err(resp) = &res {
        if let Some(err) = &resp.error {
            warn!(tool = tool_name, code = err.code, "tool call failed: {}", err.message);
        }
    }
    res.unwrap_or_else(|err_resp| err_resp)
}

async fn classify_intent_tool(state: &AppState, args: &Value, req_id: &Value) -> Result<Response, Response> {
    let fail = |e: IntentError| utils::intent_error_response(req_id, &e);
    let text = utils::get_required_arg::<String>(args, "text", req_id)?;
    let assets = utils::get_optional_arg::<Value>(args, "available_assets", req_id)?;
    let intent = state.classify(&text, assets.as_ref()).await.map_err(fail)?;
    let summary = format!("Classified as {}", intent.kind());
    Ok(Response::success(
        req_id.clone(),
        make_texty_result(summary, json!({ "intent": to_value(req_id, &intent)? })),
    ))
}

async fn plan_intent_tool(state: &AppState, args: &Value, req_id: &Value) -> Result<Response, Response> {
    let fail = |e: IntentError| utils::intent_error_response(req_id, &e);
    let raw = utils::get_required_arg::<Value>(args, "intent", req_id)?;
    let registry = utils::get_optional_arg::<TokenRegistry>(args, "registry", req_id)?;
    let address_book = utils::get_optional_arg::<AddressBook>(args, "address_book", req_id)?;
    let config = utils::get_optional_arg::<PlanConfig>(args, "config", req_id)?;

    let intent = Intent::from_value(raw).map_err(fail)?;
    if let Some(r) = &registry {
        r.validate()
            .map_err(|e| fail(IntentError::InvalidRequest(e.to_string())))?;
    }
    let outcome = state
        .plan(&intent, registry.as_ref(), address_book.as_ref(), config.as_ref())
        .await
        .map_err(fail)?;
    Ok(Response::success(
        req_id.clone(),
        make_texty_result(summarize_outcome(&outcome), to_value(req_id, &outcome)?),
    ))
}

async fn chat_tool(state: &AppState, args: &Value, req_id: &Value) -> Result<Response, Response> {
    let fail = |e: IntentError| utils::intent_error_response(req_id, &e);
    let text = utils::get_required_arg::<String>(args, "text", req_id)?;
    let intent = state.classify(&text, None).await.map_err(fail)?;
    let outcome = state.plan(&intent, None, None, None).await.map_err(fail)?;
    Ok(Response::success(
        req_id.clone(),
        make_texty_result(
            summarize_outcome(&outcome),
            json!({
                "intent": to_value(req_id, &intent)?,
                "result": to_value(req_id, &outcome)?
            }),
        ),
    ))
}

async fn evm_quote_tool(state: &AppState, args: &Value, req_id: &Value) -> Result<Response, Response> {
    let fail = |e: IntentError| utils::intent_error_response(req_id, &e);
    let defaults = &state.config.plan_defaults.evm;
    let rpc_url = utils::get_optional_arg::<String>(args, "rpc_url", req_id)?
        .or_else(|| defaults.rpc_url.clone())
        .ok_or_else(|| fail(IntentError::Configuration("no EVM RPC URL configured".into())))?;
    let router = utils::get_optional_arg::<String>(args, "router", req_id)?
        .or_else(|| defaults.router.clone())
        .ok_or_else(|| fail(IntentError::Configuration("no EVM router configured".into())))?;
    let amount_in_wei = utils::get_required_arg::<String>(args, "amount_in_wei", req_id)?;
    let path = utils::get_required_arg::<Vec<String>>(args, "path", req_id)?;

    let router = parse_address(&router, "router").map_err(fail)?;
    let amount_in = U256::from_dec_str(amount_in_wei.trim()).map_err(|_| {
        fail(IntentError::InvalidRequest(format!(
            "amount_in_wei '{}' is not a decimal integer",
            amount_in_wei
        )))
    })?;
    let path = path
        .iter()
        .map(|hop| parse_address(hop, "path hop"))
        .collect::<Result<Vec<_>, _>>()
        .map_err(fail)?;

    let amounts = state
        .evm_quoter
        .amounts_out(&rpc_url, router, amount_in, &path)
        .await
        .map_err(fail)?;
    let amounts: Vec<String> = amounts.iter().map(U256::to_string).collect();
    let summary = format!(
        "Quoted {} hops; out {}",
        path.len(),
        amounts.last().map(String::as_str).unwrap_or("-")
    );
    Ok(Response::success(
        req_id.clone(),
        make_texty_result(summary, json!({ "amounts": amounts })),
    ))
}

/// Handles the 'initialize' request.
fn handle_initialize(req: &Request) -> Response {
    let server_info = json!({
        "name": "intent_planner",
        "version": env!("CARGO_PKG_VERSION")
    });
    let capabilities = json!({ "tools": { "listChanged": false } });
    let instructions = "Turns wallet requests in plain language into typed intents and unsigned \
        EVM or Solana transaction plans. Nothing is signed or broadcast.";

    Response::success(
        req.id.clone(),
        json!({
            "serverInfo": server_info,
            "protocolVersion": "2025-06-18",
            "capabilities": capabilities,
            "instructions": instructions
        }),
    )
}

/// Handles the 'tools/list' request by returning a JSON definition of all available tools.
fn handle_tools_list(req: &Request) -> Response {
    let tools = json!([
        {
            "name": "classify_intent",
            "description": "Classify a wallet request in plain language into a transfer, swap or price_prediction intent.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "text": {"type": "string", "description": "The user's message."},
                    "available_assets": {"type": "object", "description": "Supported assets shown to the model; defaults to the server registry."}
                },
                "required": ["text"]
            }
        },
        {
            "name": "plan_intent",
            "description": "Build an unsigned EVM transaction, a Solana plan descriptor or a toy price forecast for an intent.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "intent": {"type": "object", "description": "An intent as returned by classify_intent."},
                    "registry": {"type": "object", "description": "Token registry override ({evm: {...}, solana: {...}})."},
                    "address_book": {"type": "object", "description": "Alias -> address override."},
                    "config": {"type": "object", "description": "Plan config overlay, e.g. {evm: {router, rpcUrl, path, to}}."}
                },
                "required": ["intent"]
            }
        },
        {
            "name": "chat",
            "description": "Classify a message and plan the resulting intent with server defaults.",
            "inputSchema": {
                "type": "object",
                "properties": {"text": {"type": "string"}},
                "required": ["text"]
            }
        },
        {
            "name": "evm_quote",
            "description": "Quote an exact-in swap with a Uniswap-V2 style router's getAmountsOut.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "rpc_url": {"type": "string", "description": "Defaults to EVM_RPC_URL."},
                    "router": {"type": "string", "description": "Defaults to EVM_ROUTER."},
                    "amount_in_wei": {"type": "string", "description": "Input amount in base units, decimal."},
                    "path": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["amount_in_wei", "path"]
            }
        },
        {
            "name": "list_supported_assets",
            "description": "List registry tokens per chain family and address-book aliases.",
            "inputSchema": { "type": "object", "properties": {}, "additionalProperties": false }
        }
    ]);
    Response::success(req.id.clone(), json!({ "tools": tools }))
}
