//! # Intent Module
//!
//! Typed representation of what a user asked for. An intent is produced once
//! by a classifier and never mutated afterwards; the planner consumes it.
//!
//! ## Variants
//! - `transfer` - move a token to an alias or raw address
//! - `swap` - exchange one token for another with bounded slippage
//! - `price_prediction` - show the toy forecast for a list of tokens

pub mod forecast;
pub mod schema;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use validator::Validate;

use crate::error::IntentError;

/// Swap slippage applied when the intent does not carry one (0.5%).
pub const DEFAULT_SLIPPAGE_BPS: u32 = 50;
pub const MIN_SLIPPAGE_BPS: u32 = 1;
pub const MAX_SLIPPAGE_BPS: u32 = 300;

/// Forecast horizon used when a prediction intent omits one.
pub const DEFAULT_HORIZON_DAYS: u32 = 7;

const INTENT_TYPES: &[&str] = &["transfer", "swap", "price_prediction"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    Evm,
    Solana,
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainFamily::Evm => write!(f, "evm"),
            ChainFamily::Solana => write!(f, "solana"),
        }
    }
}

/// Which planning and quoting path applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum Chain {
    Evm { chain_id: u64 },
    Solana,
}

impl Chain {
    pub fn family(&self) -> ChainFamily {
        match self {
            Chain::Evm { .. } => ChainFamily::Evm,
            Chain::Solana => ChainFamily::Solana,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TransferIntent {
    pub chain: Chain,
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 1))]
    pub amount: String,
    #[validate(length(min = 1))]
    pub to: String,
    #[serde(default)]
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SwapIntent {
    pub chain: Chain,
    #[validate(length(min = 1))]
    pub sell_token: String,
    #[validate(length(min = 1))]
    pub buy_token: String,
    #[validate(length(min = 1))]
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 300))]
    pub slippage_bps: Option<u32>,
}

impl SwapIntent {
    /// Slippage to apply, defaulted and clamped into the accepted range.
    pub fn effective_slippage_bps(&self) -> u32 {
        self.slippage_bps
            .unwrap_or(DEFAULT_SLIPPAGE_BPS)
            .clamp(MIN_SLIPPAGE_BPS, MAX_SLIPPAGE_BPS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PricePredictionIntent {
    #[validate(length(min = 1))]
    pub tokens: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 365))]
    pub horizon_days: Option<u32>,
}

impl PricePredictionIntent {
    pub fn effective_horizon_days(&self) -> u32 {
        self.horizon_days.unwrap_or(DEFAULT_HORIZON_DAYS)
    }
}

/// Exactly one active variant; the `type` tag is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    Transfer(TransferIntent),
    Swap(SwapIntent),
    PricePrediction(PricePredictionIntent),
}

impl Intent {
    pub fn kind(&self) -> &'static str {
        match self {
            Intent::Transfer(_) => "transfer",
            Intent::Swap(_) => "swap",
            Intent::PricePrediction(_) => "price_prediction",
        }
    }

    pub fn chain(&self) -> Option<Chain> {
        match self {
            Intent::Transfer(t) => Some(t.chain),
            Intent::Swap(s) => Some(s.chain),
            Intent::PricePrediction(_) => None,
        }
    }

    /// Parse an intent from untrusted JSON.
    ///
    /// An absent or unrecognised `type` is an `UnsupportedIntent`; a known
    /// type with bad fields is an `InvalidIntent`.
    pub fn from_value(value: Value) -> Result<Self, IntentError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| IntentError::UnsupportedIntent("missing intent type".to_string()))?;
        if !INTENT_TYPES.contains(&kind) {
            return Err(IntentError::UnsupportedIntent(kind.to_string()));
        }

        let intent: Intent = serde_json::from_value(value)
            .map_err(|e| IntentError::InvalidIntent(e.to_string()))?;
        intent.check()?;
        Ok(intent)
    }

    /// Field-level validation (ranges, non-empty strings).
    pub fn check(&self) -> Result<(), IntentError> {
        let outcome = match self {
            Intent::Transfer(t) => t.validate(),
            Intent::Swap(s) => s.validate(),
            Intent::PricePrediction(p) => p.validate(),
        };
        outcome.map_err(|e| IntentError::InvalidIntent(e.to_string()))
    }
}
