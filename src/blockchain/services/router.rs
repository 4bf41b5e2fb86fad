// src/blockchain/services/router.rs

use async_trait::async_trait;
use ethers::types::{Address, U256};
use tracing::{debug, warn};

use crate::blockchain::client::RpcClient;
use crate::blockchain::services::token::{decode_amounts, get_amounts_out_data};
use crate::error::IntentError;

/// Exact-in quoting against a constant-product router.
#[async_trait]
pub trait RouterQuoter: Send + Sync {
    /// Amounts along `path`, first element is `amount_in`.
    async fn amounts_out(
        &self,
        rpc_url: &str,
        router: Address,
        amount_in: U256,
        path: &[Address],
    ) -> Result<Vec<U256>, IntentError>;
}

/// Calls `getAmountsOut` on a Uniswap-V2 style router via `eth_call`.
#[derive(Clone, Debug, Default)]
pub struct UniswapV2Quoter {
    client: RpcClient,
}

impl UniswapV2Quoter {
    pub fn new(client: RpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RouterQuoter for UniswapV2Quoter {
    async fn amounts_out(
        &self,
        rpc_url: &str,
        router: Address,
        amount_in: U256,
        path: &[Address],
    ) -> Result<Vec<U256>, IntentError> {
        if path.len() < 2 {
            return Err(IntentError::InvalidRequest(
                "swap path needs at least two addresses".to_string(),
            ));
        }
        let data = get_amounts_out_data(amount_in, path);
        let raw = self.client.eth_call(rpc_url, router, data).await.map_err(|e| {
            warn!(router = ?router, error = %e, "getAmountsOut failed");
            e
        })?;
        let amounts = decode_amounts(&raw)?;
        debug!(hops = path.len(), amounts = ?amounts, "router quote");
        Ok(amounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::abi::{encode, Token};
    use mockito::mock;
    use serde_json::json;

    #[tokio::test]
    async fn test_amounts_out_decodes_eth_call_result() {
        let encoded = encode(&[Token::Array(vec![
            Token::Uint(U256::from(100u64)),
            Token::Uint(U256::from(1000u64)),
        ])]);
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": format!("0x{}", hex::encode(encoded))
        });
        let m = mock("POST", "/router-quote-ok")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create();

        let quoter = UniswapV2Quoter::default();
        let rpc = format!("{}/router-quote-ok", mockito::server_url());
        let path = [Address::from_low_u64_be(1), Address::from_low_u64_be(2)];
        let amounts = quoter
            .amounts_out(&rpc, Address::from_low_u64_be(3), U256::from(100u64), &path)
            .await
            .unwrap();

        m.assert();
        assert_eq!(amounts.last().copied(), Some(U256::from(1000u64)));
    }

    #[tokio::test]
    async fn test_rpc_failure_carries_status_and_body() {
        let _m = mock("POST", "/router-quote-down")
            .with_status(503)
            .with_body("node unavailable")
            .create();

        let quoter = UniswapV2Quoter::default();
        let rpc = format!("{}/router-quote-down", mockito::server_url());
        let path = [Address::from_low_u64_be(1), Address::from_low_u64_be(2)];
        let err = quoter
            .amounts_out(&rpc, Address::from_low_u64_be(3), U256::one(), &path)
            .await
            .unwrap_err();

        match err {
            IntentError::UpstreamQuote { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "node unavailable");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_revert_is_upstream_error() {
        let _m = mock("POST", "/router-quote-revert")
            .with_status(200)
            .with_body(r#"{"jsonrpc":"2.0","id":1,"error":{"code":3,"message":"execution reverted"}}"#)
            .create();

        let quoter = UniswapV2Quoter::default();
        let rpc = format!("{}/router-quote-revert", mockito::server_url());
        let path = [Address::from_low_u64_be(1), Address::from_low_u64_be(2)];
        let err = quoter
            .amounts_out(&rpc, Address::from_low_u64_be(3), U256::one(), &path)
            .await
            .unwrap_err();
        assert!(matches!(err, IntentError::UpstreamQuote { ref body, .. } if body.contains("reverted")));
        assert_eq!(err.status().as_u16(), 502);
    }
}
