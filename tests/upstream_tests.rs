//! End-to-end routes against mocked upstreams (LLM, RPC node, aggregator)

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use ethers_core::abi::{encode, Token};
use mockito::{mock, Matcher};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use intent_planner::{
    api::create_router,
    blockchain::{
        services::{JupiterQuoter, UniswapV2Quoter},
        AddressBook, RpcClient, TokenRegistry,
    },
    classifier,
    config::{Config, LlmConfig, LlmProvider},
    AppState, U256,
};

fn app(prefix: &str, llm: Option<LlmConfig>) -> Router {
    let http = reqwest::Client::new();
    let mut config = Config::default();
    config.plan_defaults.evm.rpc_url = Some(format!("{}{}/rpc", mockito::server_url(), prefix));
    let jupiter = JupiterQuoter::new(http.clone(), format!("{}{}/jup", mockito::server_url(), prefix));
    let state = AppState::new(
        config,
        TokenRegistry::demo(),
        AddressBook::demo(),
        classifier::from_config(llm.as_ref(), http.clone()),
        Arc::new(UniswapV2Quoter::new(RpcClient::from_client(http))),
        Arc::new(jupiter.clone()),
        jupiter,
    );
    create_router(state)
}

fn openai(prefix: &str) -> LlmConfig {
    LlmConfig {
        provider: LlmProvider::OpenAi,
        api_key: SecretString::new("sk-test".to_string()),
        model: "gpt-4o-mini".to_string(),
        base_url: format!("{}{}/llm", mockito::server_url(), prefix),
    }
}

async fn send(router: Router, method: Method, uri: &str, body: Option<String>) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(b) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(b)
        }
        None => Body::empty(),
    };
    let response = router.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn amounts_result(amounts: &[u64]) -> String {
    let encoded = encode(&[Token::Array(
        amounts.iter().map(|a| Token::Uint(U256::from(*a))).collect(),
    )]);
    json!({"jsonrpc": "2.0", "id": 1, "result": format!("0x{}", hex::encode(encoded))}).to_string()
}

#[tokio::test]
async fn test_evm_quote_route_calls_rpc() {
    let rpc = mock("POST", "/t-evmq/rpc")
        .match_body(Matcher::PartialJson(json!({"method": "eth_call"})))
        .with_status(200)
        .with_body(amounts_result(&[1_000_000, 2_500_000]))
        .create();

    let body = json!({
        "rpcUrl": format!("{}/t-evmq/rpc", mockito::server_url()),
        "router": "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE",
        "amountInWei": "1000000",
        "path": [
            "0x471EcE3750Da237f93B8E339c536989b8978a438",
            "0x765DE816845861e75A25fCA122bb6898B8B1282a"
        ]
    });
    let (status, text) = send(
        app("/t-evmq", None),
        Method::POST,
        "/api/evm/quote",
        Some(body.to_string()),
    )
    .await;

    rpc.assert();
    assert_eq!(status, StatusCode::OK);
    let v: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["amounts"], json!(["1000000", "2500000"]));
}

#[tokio::test]
async fn test_evm_quote_route_relays_rpc_failure() {
    let _rpc = mock("POST", "/t-evmq-err/rpc")
        .with_status(429)
        .with_body("rate limited")
        .create();

    let body = json!({
        "rpcUrl": format!("{}/t-evmq-err/rpc", mockito::server_url()),
        "router": "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE",
        "amountInWei": "1",
        "path": [
            "0x471EcE3750Da237f93B8E339c536989b8978a438",
            "0x765DE816845861e75A25fCA122bb6898B8B1282a"
        ]
    });
    let (status, text) = send(
        app("/t-evmq-err", None),
        Method::POST,
        "/api/evm/quote",
        Some(body.to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    let v: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["code"], "UPSTREAM_QUOTE_ERROR");
    assert_eq!(v["details"]["body"], "rate limited");
}

#[tokio::test]
async fn test_evm_swap_plan_uses_default_rpc() {
    let _rpc = mock("POST", "/t-swap/rpc")
        .with_status(200)
        .with_body(amounts_result(&[100, 1000]))
        .create();

    let plan = json!({
        "intent": {
            "type": "swap",
            "chain": {"family": "evm", "chain_id": 42220},
            "sell_token": "CELO",
            "buy_token": "cUSD",
            "amount": "0.0000000000000001"
        }
    });
    let (status, text) = send(app("/t-swap", None), Method::POST, "/api/plan", Some(plan.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    let v: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["quote"]["amountOut"], "1000");
    assert_eq!(v["quote"]["minOut"], "995");
    assert!(v["unsigned"]["payload"]["data"].as_str().unwrap().starts_with("0x38ed1739"));
}

#[tokio::test]
async fn test_jupiter_quote_proxy_forwards_query_verbatim() {
    let upstream = mock("GET", "/t-jq/jup/quote")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("inputMint".into(), "So11111111111111111111111111111111111111112".into()),
            Matcher::UrlEncoded("amount".into(), "1000".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"outAmount":"7"}"#)
        .create();

    let (status, text) = send(
        app("/t-jq", None),
        Method::GET,
        "/api/jupiter/quote?inputMint=So11111111111111111111111111111111111111112&amount=1000",
        None,
    )
    .await;

    upstream.assert();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, r#"{"outAmount":"7"}"#);
}

#[tokio::test]
async fn test_jupiter_swap_proxy_relays_upstream_status() {
    let _upstream = mock("POST", "/t-js/jup/swap")
        .with_status(400)
        .with_body(r#"{"error":"invalid quoteResponse"}"#)
        .create();

    let (status, text) = send(
        app("/t-js", None),
        Method::POST,
        "/api/jupiter/swap",
        Some(r#"{"quoteResponse":null}"#.to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(text.contains("invalid quoteResponse"));
}

#[tokio::test]
async fn test_solana_swap_plan_picks_first_route() {
    let _upstream = mock("GET", "/t-sol/jup/quote")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"data":[{"outAmount":"148000000","priceImpactPct":0.01},{"outAmount":"1"}]}"#)
        .create();

    let plan = json!({
        "intent": {
            "type": "swap",
            "chain": {"family": "solana"},
            "sell_token": "SOL",
            "buy_token": "USDC",
            "amount": "1"
        }
    });
    let (status, text) = send(app("/t-sol", None), Method::POST, "/api/plan", Some(plan.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    let v: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["route"]["outAmount"], "148000000");
}

#[tokio::test]
async fn test_intent_route_with_openai_tool_call() {
    let reply = json!({
        "choices": [{
            "message": {
                "tool_calls": [{
                    "type": "function",
                    "function": {
                        "name": "create_intent",
                        "arguments": "{\"type\":\"price_prediction\",\"tokens\":[\"CELO\",\"SOL\"]}"
                    }
                }]
            }
        }]
    });
    let llm = mock("POST", "/t-llm/llm/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .with_status(200)
        .with_body(reply.to_string())
        .create();

    let (status, text) = send(
        app("/t-llm", Some(openai("/t-llm"))),
        Method::POST,
        "/api/intent",
        Some(json!({"text": "where is CELO going?", "defaults": {"evm": {}}}).to_string()),
    )
    .await;

    llm.assert();
    assert_eq!(status, StatusCode::OK);
    let v: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["intent"]["type"], "price_prediction");
    assert_eq!(v["intent"]["tokens"], json!(["CELO", "SOL"]));
}

#[tokio::test]
async fn test_intent_route_without_tool_call_is_500() {
    let _llm = mock("POST", "/t-llm-none/llm/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"Hello!"}}]}"#)
        .create();

    let (status, text) = send(
        app("/t-llm-none", Some(openai("/t-llm-none"))),
        Method::POST,
        "/api/intent",
        Some(json!({"text": "hello"}).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let v: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["code"], "CLASSIFICATION_ERROR");
}
