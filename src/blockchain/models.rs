// src/blockchain/models.rs
use ethers::types::{Bytes, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blockchain::registry::{AddressBook, TokenRecord, TokenRegistry};
use crate::blockchain::services::token::parse_address;
use crate::error::IntentError;
use crate::intent::forecast::Forecast;
use crate::intent::Intent;

// --- Planning configuration ---

/// EVM settings for swap planning. Every field is optional so a request can
/// override only what it needs on top of the process defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmPlanConfig {
    /// Constant-product router used for quoting and as the swap target.
    #[serde(default)]
    pub router: Option<String>,
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// Explicit hop path; defaults to `[sell, buy]`.
    #[serde(default)]
    pub path: Option<Vec<String>>,
    /// Recipient of the swap output.
    #[serde(default)]
    pub to: Option<String>,
}

impl EvmPlanConfig {
    /// Fill unset fields from `defaults`.
    pub fn overlay(&self, defaults: &EvmPlanConfig) -> EvmPlanConfig {
        EvmPlanConfig {
            router: self.router.clone().or_else(|| defaults.router.clone()),
            rpc_url: self.rpc_url.clone().or_else(|| defaults.rpc_url.clone()),
            path: self.path.clone().or_else(|| defaults.path.clone()),
            to: self.to.clone().or_else(|| defaults.to.clone()),
        }
    }

    /// The fields `overlay` would take from `defaults`.
    pub fn inherited(&self, defaults: &EvmPlanConfig) -> EvmPlanConfig {
        EvmPlanConfig {
            router: self.router.is_none().then(|| defaults.router.clone()).flatten(),
            rpc_url: self.rpc_url.is_none().then(|| defaults.rpc_url.clone()).flatten(),
            path: self.path.is_none().then(|| defaults.path.clone()).flatten(),
            to: self.to.is_none().then(|| defaults.to.clone()).flatten(),
        }
    }

    /// Parse every address that is set. Unset fields are not an error here.
    pub fn check_addresses(&self) -> Result<(), IntentError> {
        if let Some(router) = &self.router {
            parse_address(router, "router")?;
        }
        if let Some(to) = &self.to {
            parse_address(to, "swap recipient")?;
        }
        for hop in self.path.iter().flatten() {
            parse_address(hop, "path hop")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    #[serde(default)]
    pub evm: EvmPlanConfig,
}

impl PlanConfig {
    pub fn overlay(&self, defaults: &PlanConfig) -> PlanConfig {
        PlanConfig {
            evm: self.evm.overlay(&defaults.evm),
        }
    }
}

/// Everything a plan call resolves against.
#[derive(Debug, Clone, Copy)]
pub struct PlanContext<'a> {
    pub registry: &'a TokenRegistry,
    pub address_book: &'a AddressBook,
    pub config: &'a PlanConfig,
}

// --- Plan outputs ---

/// EIP-1559 style unsigned transaction. Quantities serialize as `0x` hex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedEvmTx {
    pub chain_id: u64,
    #[serde(rename = "type")]
    pub tx_type: u8,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsignedPlan {
    pub payload: UnsignedEvmTx,
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
    pub amount_out: String,
    pub min_out: String,
    pub slippage_bps: u32,
}

/// Wallet-side descriptor for a Solana transfer; no instruction encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolanaTransferPlan {
    pub chain: String,
    pub to: String,
    pub token: TokenRecord,
    pub amount: String,
    pub base_units: String,
}

/// What a single plan call returns. The JSON shape is distinguished by its
/// top-level keys, which the presentation layer switches on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlanOutcome {
    Prediction {
        ok: bool,
        intent: Intent,
        predictions: Vec<Forecast>,
    },
    EvmTransfer {
        unsigned: UnsignedPlan,
    },
    EvmSwap {
        quote: SwapQuote,
        unsigned: UnsignedPlan,
    },
    SolanaTransfer {
        plan: SolanaTransferPlan,
    },
    SolanaSwap {
        route: Value,
    },
}

// --- Quote provider wire models ---

/// Body of `POST /evm/quote`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmQuoteRequest {
    pub rpc_url: String,
    pub router: String,
    pub amount_in_wei: String,
    pub path: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvmQuoteResponse {
    pub amounts: Vec<String>,
}

/// Query for the Solana aggregator's quote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatorQuoteQuery {
    pub input_mint: String,
    pub output_mint: String,
    pub amount: u64,
    pub slippage_bps: u32,
}
