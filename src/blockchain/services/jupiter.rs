// src/blockchain/services/jupiter.rs

//! Solana swap aggregator (Jupiter v6 HTTP API).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::blockchain::models::AggregatorQuoteQuery;
use crate::error::IntentError;

pub const DEFAULT_JUPITER_API_URL: &str = "https://quote-api.jup.ag/v6";

#[async_trait]
pub trait AggregatorQuoter: Send + Sync {
    /// Raw aggregator quote response for an exact-in trade.
    async fn quote(&self, query: &AggregatorQuoteQuery) -> Result<Value, IntentError>;
}

/// Status and body of a relayed upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: String,
}

#[derive(Clone, Debug)]
pub struct JupiterQuoter {
    http: Client,
    base_url: String,
}

impl JupiterQuoter {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// `GET /quote` with the caller's query string passed through untouched.
    pub async fn forward_quote(&self, raw_query: &str) -> Result<UpstreamReply, IntentError> {
        let url = if raw_query.is_empty() {
            format!("{}/quote", self.base_url)
        } else {
            format!("{}/quote?{}", self.base_url, raw_query)
        };
        debug!(url = %url, "forwarding aggregator quote");
        let resp = self.http.get(&url).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(UpstreamReply { status, body })
    }

    /// `POST /swap` with the caller's body passed through untouched.
    pub async fn forward_swap(&self, body: String) -> Result<UpstreamReply, IntentError> {
        let url = format!("{}/swap", self.base_url);
        debug!(url = %url, bytes = body.len(), "forwarding aggregator swap build");
        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(UpstreamReply { status, body })
    }
}

#[async_trait]
impl AggregatorQuoter for JupiterQuoter {
    async fn quote(&self, query: &AggregatorQuoteQuery) -> Result<Value, IntentError> {
        let url = format!("{}/quote", self.base_url);
        let amount = query.amount.to_string();
        let slippage = query.slippage_bps.to_string();
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("inputMint", query.input_mint.as_str()),
                ("outputMint", query.output_mint.as_str()),
                ("amount", amount.as_str()),
                ("slippageBps", slippage.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "aggregator quote failed");
            return Err(IntentError::UpstreamQuote {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body)
            .map_err(|e| IntentError::MalformedUpstream(format!("aggregator quote is not JSON: {}", e)))
    }
}

/// Pick the best route. Older responses wrap routes in `{data: [...]}`
/// sorted best-first; v6 returns a single quote object.
pub fn select_best_route(response: Value) -> Option<Value> {
    match response {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(routes)) => routes.into_iter().next(),
            Some(_) => None,
            None if map.is_empty() => None,
            None => Some(Value::Object(map)),
        },
        Value::Array(routes) => routes.into_iter().next(),
        _ => None,
    }
}
