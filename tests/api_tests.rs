//! HTTP tests for the intent and plan routes, with in-process collaborators

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use intent_planner::{
    api::create_router,
    blockchain::{
        models::AggregatorQuoteQuery,
        services::{AggregatorQuoter, JupiterQuoter, RouterQuoter},
        AddressBook, TokenRegistry,
    },
    classifier::{Classifier, UnconfiguredClassifier},
    config::Config,
    error::IntentError,
    intent::Intent,
    AppState, Address, U256,
};

/// Returns a fixed intent regardless of the text.
struct ScriptedClassifier(Value);

#[async_trait]
impl Classifier for ScriptedClassifier {
    fn provider(&self) -> &str {
        "scripted"
    }

    async fn classify(&self, _text: &str, _assets: &Value) -> Result<Intent, IntentError> {
        Intent::from_value(self.0.clone())
    }
}

#[derive(Default)]
struct CountingQuoter {
    calls: AtomicUsize,
}

#[async_trait]
impl RouterQuoter for CountingQuoter {
    async fn amounts_out(
        &self,
        _rpc_url: &str,
        _router: Address,
        amount_in: U256,
        _path: &[Address],
    ) -> Result<Vec<U256>, IntentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![amount_in, U256::from(1000u64)])
    }
}

#[async_trait]
impl AggregatorQuoter for CountingQuoter {
    async fn quote(&self, _query: &AggregatorQuoteQuery) -> Result<Value, IntentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({"data": []}))
    }
}

struct TestApp {
    router: Router,
    quoter: Arc<CountingQuoter>,
}

fn test_app(classifier: Arc<dyn Classifier>) -> TestApp {
    test_app_with_config(classifier, Config::default())
}

fn test_app_with_config(classifier: Arc<dyn Classifier>, config: Config) -> TestApp {
    let quoter = Arc::new(CountingQuoter::default());
    let state = AppState::new(
        config,
        TokenRegistry::demo(),
        AddressBook::demo(),
        classifier,
        quoter.clone(),
        quoter.clone(),
        JupiterQuoter::new(reqwest::Client::new(), "http://jupiter.invalid"),
    );
    TestApp {
        router: create_router(state),
        quoter,
    }
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = test_app(Arc::new(UnconfiguredClassifier));
    let (status, body) = send(&app.router, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_assets_lists_registry_and_aliases() {
    let app = test_app(Arc::new(UnconfiguredClassifier));
    let (status, body) = send(&app.router, Method::GET, "/api/assets", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["evm"]["cUSD"]["decimals"], 18);
    assert_eq!(body["solana"]["USDC"]["decimals"], 6);
    assert_eq!(body["addressBook"], json!(["brother", "me_solana"]));
}

#[tokio::test]
async fn test_plan_evm_token_transfer() {
    let app = test_app(Arc::new(UnconfiguredClassifier));
    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/plan",
        Some(json!({
            "intent": {
                "type": "transfer",
                "chain": {"family": "evm", "chain_id": 42220},
                "token": "cUSD",
                "amount": "5",
                "to": "brother",
                "memo": null
            }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let payload = &body["unsigned"]["payload"];
    assert_eq!(payload["chainId"], 42220);
    assert_eq!(payload["type"], 2);
    assert_eq!(
        payload["to"].as_str().unwrap().to_lowercase(),
        "0x765de816845861e75a25fca122bb6898b8b1282a"
    );
    assert_eq!(payload["value"], "0x0");
    assert!(payload["data"].as_str().unwrap().starts_with("0xa9059cbb"));
    assert_eq!(body["unsigned"]["preview"], "EVM transfer");
}

#[tokio::test]
async fn test_plan_prediction_makes_no_quote_calls() {
    let app = test_app(Arc::new(UnconfiguredClassifier));
    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/plan",
        Some(json!({"intent": {"type": "price_prediction", "tokens": ["CELO"], "horizon_days": 30}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["predictions"][0]["token"], "CELO");
    assert_eq!(app.quoter.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_plan_error_statuses() {
    let app = test_app(Arc::new(UnconfiguredClassifier));

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/plan",
        Some(json!({"intent": {"type": "stake", "amount": "1"}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNSUPPORTED_INTENT");

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/plan",
        Some(json!({"intent": {
            "type": "transfer",
            "chain": {"family": "solana"},
            "token": "cUSD",
            "amount": "1",
            "to": "me_solana"
        }})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNKNOWN_TOKEN");
    assert_eq!(body["details"]["family"], "solana");

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/plan",
        Some(json!({"intent": {
            "type": "transfer",
            "chain": {"family": "evm", "chain_id": 42220},
            "token": "cUSD",
            "amount": "1.2.3",
            "to": "brother"
        }})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_AMOUNT");

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/plan",
        Some(json!({"intent": {
            "type": "swap",
            "chain": {"family": "solana"},
            "sell_token": "SOL",
            "buy_token": "USDC",
            "amount": "1"
        }})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "NO_ROUTE");
}

#[tokio::test]
async fn test_plan_with_request_overrides() {
    let app = test_app(Arc::new(UnconfiguredClassifier));
    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/plan",
        Some(json!({
            "intent": {
                "type": "swap",
                "chain": {"family": "evm", "chain_id": 10},
                "sell_token": "WETH",
                "buy_token": "USDC",
                "amount": "100",
                "slippage_bps": 100
            },
            "registry": {
                "evm": {
                    "WETH": {"symbol": "WETH", "decimals": 0, "address": "0x4200000000000000000000000000000000000006"},
                    "USDC": {"symbol": "USDC", "decimals": 6, "address": "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85"}
                }
            },
            "config": {"evm": {"router": "0x4A7b5Da61326A6379179b40d00F57E5bbDC962c2"}}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quote"]["amountOut"], "1000");
    assert_eq!(body["quote"]["minOut"], "990");
    assert_eq!(body["quote"]["slippageBps"], 100);
    assert_eq!(
        body["unsigned"]["payload"]["to"].as_str().unwrap().to_lowercase(),
        "0x4a7b5da61326a6379179b40d00f57e5bbdc962c2"
    );
    assert_eq!(app.quoter.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_intent_without_llm_key_is_configuration_error() {
    let app = test_app(Arc::new(UnconfiguredClassifier));
    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/intent",
        Some(json!({"text": "send 5 cUSD to brother"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "CONFIGURATION_ERROR");
}

#[tokio::test]
async fn test_chat_classifies_then_plans() {
    let app = test_app(Arc::new(ScriptedClassifier(json!({
        "type": "transfer",
        "chain": {"family": "solana"},
        "token": "SOL",
        "amount": "0.25",
        "to": "me_solana"
    }))));
    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/chat",
        Some(json!({"text": "send a quarter SOL to my other wallet"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intent"]["type"], "transfer");
    assert_eq!(body["result"]["plan"]["baseUnits"], "250000000");
    assert_eq!(body["result"]["plan"]["chain"], "solana");
}

#[tokio::test]
async fn test_rpc_route_lists_tools() {
    let app = test_app(Arc::new(UnconfiguredClassifier));
    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/rpc",
        Some(json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["result"]["tools"].as_array().unwrap().len() >= 5);
}

async fn send_raw(router: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_malformed_bodies_get_structured_errors() {
    let app = test_app(Arc::new(UnconfiguredClassifier));

    for (uri, body) in [
        ("/api/plan", "{}"),
        ("/api/plan", "not json"),
        (
            "/api/plan",
            r#"{"intent": {"type": "price_prediction", "tokens": ["CELO"]}, "config": {"evm": {"path": "x"}}}"#,
        ),
        ("/api/intent", r#"{"text": 5}"#),
        ("/api/chat", "["),
        ("/api/evm/quote", r#"{"router": "0x00"}"#),
    ] {
        let (status, value) = send_raw(&app.router, uri, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", uri, body);
        assert_eq!(value["code"], "INVALID_REQUEST", "{} {}", uri, body);
        assert!(value["error"].as_str().unwrap().starts_with("invalid request"));
    }
}

#[tokio::test]
async fn test_rpc_route_reports_parse_error() {
    let app = test_app(Arc::new(UnconfiguredClassifier));
    let (status, body) = send_raw(&app.router, "/api/rpc", "not json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], -32700);
    assert_eq!(body["id"], Value::Null);
}

#[tokio::test]
async fn test_bad_default_router_is_configuration_error() {
    let mut config = Config::default();
    config.plan_defaults.evm.router = Some("not-a-router".to_string());
    let app = test_app_with_config(Arc::new(UnconfiguredClassifier), config);
    let swap = json!({
        "type": "swap",
        "chain": {"family": "evm", "chain_id": 42220},
        "sell_token": "CELO",
        "buy_token": "cUSD",
        "amount": "1"
    });

    let (status, body) = send(&app.router, Method::POST, "/api/plan", Some(json!({"intent": swap.clone()}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "CONFIGURATION_ERROR");
    assert_eq!(app.quoter.calls.load(Ordering::SeqCst), 0);

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/plan",
        Some(json!({"intent": swap.clone(), "config": {"evm": {"router": "still-not-a-router"}}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/api/plan",
        Some(json!({"intent": swap, "config": {"evm": {"router": "0x4A7b5Da61326A6379179b40d00F57E5bbDC962c2"}}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
