//! Blockchain client module for EVM-compatible networks.
//!
//! Read-only JSON-RPC access: the planner never signs or broadcasts, so the
//! only call it needs is `eth_call` against a caller-chosen endpoint.

use ethers::types::{Address, Bytes};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::IntentError;

/// `eth_call` over a shared reqwest client.
#[derive(Clone, Debug, Default)]
pub struct RpcClient {
    http: Client,
}

impl RpcClient {
    pub fn from_client(http: Client) -> Self {
        Self { http }
    }

    /// Execute a read-only contract call at the latest block.
    pub async fn eth_call(&self, rpc_url: &str, to: Address, data: Bytes) -> Result<Bytes, IntentError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": "eth_call",
            "params": [{"to": to, "data": data}, "latest"],
            "id": 1
        });
        debug!(rpc_url, to = ?to, "eth_call");

        let resp = self.http.post(rpc_url).json(&payload).send().await?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(IntentError::UpstreamQuote {
                status: status.as_u16(),
                body,
            });
        }

        let v: Value = serde_json::from_str(&body)
            .map_err(|e| IntentError::MalformedUpstream(format!("eth_call response is not JSON: {}", e)))?;
        if let Some(err) = v.get("error") {
            return Err(IntentError::UpstreamQuote {
                status: status.as_u16(),
                body: err.to_string(),
            });
        }

        let result = v["result"]
            .as_str()
            .ok_or_else(|| IntentError::MalformedUpstream("eth_call result not string".to_string()))?;
        let raw = hex::decode(result.strip_prefix("0x").unwrap_or(result))
            .map_err(|e| IntentError::MalformedUpstream(format!("eth_call result is not hex: {}", e)))?;
        Ok(Bytes::from(raw))
    }
}
