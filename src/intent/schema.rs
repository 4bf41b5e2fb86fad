// src/intent/schema.rs

use lazy_static::lazy_static;
use serde_json::{json, Value};

/// The single tool every classifier forces the model to call.
pub const INTENT_TOOL_NAME: &str = "create_intent";
pub const INTENT_TOOL_DESCRIPTION: &str = "Wallet intent";

lazy_static! {
    /// JSON schema for the tool arguments: exactly one of the three intent shapes.
    pub static ref INTENT_SCHEMA: Value = json!({
        "type": "object",
        "oneOf": [
            {"$ref": "#/definitions/TransferIntent"},
            {"$ref": "#/definitions/SwapIntent"},
            {"$ref": "#/definitions/PricePrediction"}
        ],
        "definitions": {
            "Chain": {
                "type": "object",
                "oneOf": [
                    {
                        "type": "object",
                        "properties": {
                            "family": {"const": "evm"},
                            "chain_id": {"type": "integer"}
                        },
                        "required": ["family", "chain_id"]
                    },
                    {
                        "type": "object",
                        "properties": {"family": {"const": "solana"}},
                        "required": ["family"]
                    }
                ]
            },
            "TransferIntent": {
                "type": "object",
                "properties": {
                    "type": {"const": "transfer"},
                    "chain": {"$ref": "#/definitions/Chain"},
                    "token": {"type": "string"},
                    "amount": {"type": "string"},
                    "to": {"type": "string"},
                    "memo": {"type": ["string", "null"]}
                },
                "required": ["type", "chain", "token", "amount", "to"]
            },
            "SwapIntent": {
                "type": "object",
                "properties": {
                    "type": {"const": "swap"},
                    "chain": {"$ref": "#/definitions/Chain"},
                    "sell_token": {"type": "string"},
                    "buy_token": {"type": "string"},
                    "amount": {"type": "string"},
                    "slippage_bps": {"type": "integer", "minimum": 1, "maximum": 300}
                },
                "required": ["type", "chain", "sell_token", "buy_token", "amount"]
            },
            "PricePrediction": {
                "type": "object",
                "properties": {
                    "type": {"const": "price_prediction"},
                    "tokens": {"type": "array", "items": {"type": "string"}},
                    "horizon_days": {"type": "integer", "minimum": 1, "maximum": 365}
                },
                "required": ["type", "tokens"]
            }
        }
    });
}
