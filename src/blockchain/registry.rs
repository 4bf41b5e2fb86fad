// src/blockchain/registry.rs

//! Static lookup tables: token symbols per chain family, and recipient
//! aliases. Both are loaded once at start and only read afterwards; lookups
//! are exact, case-sensitive matches.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;

use crate::error::IntentError;
use crate::intent::{Chain, ChainFamily};

pub const MAX_TOKEN_DECIMALS: u8 = 18;

/// Wrapped SOL mint, used by the aggregator for the native asset.
pub const WRAPPED_SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// On-chain metadata for one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub symbol: String,
    pub decimals: u8,
    /// ERC-20 contract; absent (or empty) means the chain's native asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// SPL mint on Solana.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mint: Option<String>,
}

impl TokenRecord {
    /// Contract address, if this is an ERC-20 rather than the native asset.
    pub fn contract_address(&self) -> Option<&str> {
        self.address.as_deref().filter(|a| !a.is_empty())
    }

    pub fn mint_address(&self) -> Option<&str> {
        self.mint.as_deref().filter(|m| !m.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenRegistry {
    #[serde(default)]
    pub evm: HashMap<String, TokenRecord>,
    #[serde(default)]
    pub solana: HashMap<String, TokenRecord>,
}

impl TokenRegistry {
    /// Built-in demo data (Celo mainnet and Solana mainnet).
    pub fn demo() -> Self {
        let mut evm = HashMap::new();
        evm.insert(
            "CELO".to_string(),
            TokenRecord {
                symbol: "CELO".to_string(),
                decimals: 18,
                address: Some("0x471EcE3750Da237f93B8E339c536989b8978a438".to_string()),
                mint: None,
            },
        );
        evm.insert(
            "cUSD".to_string(),
            TokenRecord {
                symbol: "cUSD".to_string(),
                decimals: 18,
                address: Some("0x765DE816845861e75A25fCA122bb6898B8B1282a".to_string()),
                mint: None,
            },
        );

        let mut solana = HashMap::new();
        solana.insert(
            "SOL".to_string(),
            TokenRecord {
                symbol: "SOL".to_string(),
                decimals: 9,
                address: None,
                mint: Some(WRAPPED_SOL_MINT.to_string()),
            },
        );
        solana.insert(
            "USDC".to_string(),
            TokenRecord {
                symbol: "USDC".to_string(),
                decimals: 6,
                address: None,
                mint: Some("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string()),
            },
        );

        Self { evm, solana }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read token registry at {}", path.display()))?;
        let registry: TokenRegistry = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid token registry JSON in {}", path.display()))?;
        registry.validate()?;
        Ok(registry)
    }

    /// Checks decimals bounds and that every record is keyed by its own symbol.
    pub fn validate(&self) -> Result<()> {
        for (family, table) in [("evm", &self.evm), ("solana", &self.solana)] {
            for (key, record) in table {
                if record.decimals > MAX_TOKEN_DECIMALS {
                    bail!(
                        "{} token {} has {} decimals (max {})",
                        family,
                        key,
                        record.decimals,
                        MAX_TOKEN_DECIMALS
                    );
                }
                if key != &record.symbol {
                    bail!("{} token keyed '{}' declares symbol '{}'", family, key, record.symbol);
                }
            }
        }
        Ok(())
    }

    fn table(&self, family: ChainFamily) -> &HashMap<String, TokenRecord> {
        match family {
            ChainFamily::Evm => &self.evm,
            ChainFamily::Solana => &self.solana,
        }
    }

    /// Resolve a symbol within the chain's family.
    pub fn resolve(&self, chain: &Chain, symbol: &str) -> Result<&TokenRecord, IntentError> {
        let family = chain.family();
        self.table(family)
            .get(symbol)
            .ok_or_else(|| IntentError::UnknownToken {
                family: family.to_string(),
                symbol: symbol.to_string(),
            })
    }

    /// Rendering handed to the classifier as "supported assets".
    pub fn supported_assets(&self) -> Value {
        json!({ "evm": self.evm, "solana": self.solana })
    }
}

/// Alias -> address table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressBook {
    entries: HashMap<String, String>,
}

impl AddressBook {
    pub fn demo() -> Self {
        let mut book = Self::default();
        book.insert("brother", "0x1234567890abcdef1234567890abcdef12345678");
        book.insert("me_solana", "7sKXh9eLQ3jM8fpL3CyQzq5H4gJ3fQp6i9qV2c9oV1mP");
        book
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read address book at {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid address book JSON in {}", path.display()))
    }

    pub fn insert(&mut self, alias: impl Into<String>, address: impl Into<String>) {
        self.entries.insert(alias.into(), address.into());
    }

    pub fn aliases(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Alias lookup first, then accept the input itself if it looks like a
    /// raw address (`0x` prefix or longer than 40 characters).
    ///
    /// The raw-address check does not verify checksums or base58 alphabets.
    pub fn resolve(&self, alias_or_raw: &str) -> Result<String, IntentError> {
        if let Some(address) = self.entries.get(alias_or_raw) {
            return Ok(address.clone());
        }
        if alias_or_raw.starts_with("0x") || alias_or_raw.len() > 40 {
            return Ok(alias_or_raw.to_string());
        }
        Err(IntentError::UnknownRecipient(alias_or_raw.to_string()))
    }
}
