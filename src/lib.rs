// src/lib.rs

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{json, Value};

// Re-export commonly used types
pub use ethers::types::{Address, U256};

pub mod api;
pub mod blockchain;
pub mod classifier;
pub mod config;
pub mod error;
pub mod intent;
pub mod mcp;
pub mod utils;

use blockchain::models::{PlanConfig, PlanContext, PlanOutcome};
use blockchain::services::{AggregatorQuoter, JupiterQuoter, RouterQuoter, UniswapV2Quoter};
use blockchain::{AddressBook, Planner, RpcClient, TokenRegistry};
use classifier::Classifier;
use config::Config;
use error::IntentError;
use intent::Intent;

/// Application state shared across all request handlers. Built once at
/// start and never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<TokenRegistry>,
    pub address_book: Arc<AddressBook>,
    /// Strategy resolved from the configured LLM provider
    pub classifier: Arc<dyn Classifier>,
    /// Router quoter also served directly on `/evm/quote`
    pub evm_quoter: Arc<dyn RouterQuoter>,
    /// Aggregator client used for the raw proxy routes
    pub jupiter: JupiterQuoter,
    pub planner: Planner,
}

impl AppState {
    /// Wire up the production collaborators for `config`.
    pub fn from_config(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let registry = config.load_registry()?;
        let address_book = config.load_address_book()?;
        let classifier = classifier::from_config(config.llm.as_ref(), http.clone());
        let evm_quoter: Arc<dyn RouterQuoter> =
            Arc::new(UniswapV2Quoter::new(RpcClient::from_client(http.clone())));
        let jupiter = JupiterQuoter::new(http, config.jupiter_api_url.clone());

        Ok(Self::new(
            config,
            registry,
            address_book,
            classifier,
            evm_quoter,
            Arc::new(jupiter.clone()),
            jupiter,
        ))
    }

    pub fn new(
        config: Config,
        registry: TokenRegistry,
        address_book: AddressBook,
        classifier: Arc<dyn Classifier>,
        evm_quoter: Arc<dyn RouterQuoter>,
        solana_quoter: Arc<dyn AggregatorQuoter>,
        jupiter: JupiterQuoter,
    ) -> Self {
        AppState {
            config: Arc::new(config),
            registry: Arc::new(registry),
            address_book: Arc::new(address_book),
            classifier,
            planner: Planner::new(evm_quoter.clone(), solana_quoter),
            evm_quoter,
            jupiter,
        }
    }

    /// Registry rendering handed to the classifier when the caller sends none.
    pub fn supported_assets(&self) -> Value {
        self.registry.supported_assets()
    }

    pub fn assets_overview(&self) -> Value {
        let mut assets = self.supported_assets();
        assets["addressBook"] = json!(self.address_book.aliases());
        assets
    }

    pub async fn classify(&self, text: &str, available_assets: Option<&Value>) -> Result<Intent, IntentError> {
        if text.trim().is_empty() {
            return Err(IntentError::InvalidRequest("text must not be empty".to_string()));
        }
        match available_assets {
            Some(assets) => self.classifier.classify(text, assets).await,
            None => self.classifier.classify(text, &self.supported_assets()).await,
        }
    }

    /// Plan against the process-wide tables, or against per-request ones
    /// when given. A request config is overlaid on the process defaults.
    pub async fn plan(
        &self,
        intent: &Intent,
        registry: Option<&TokenRegistry>,
        address_book: Option<&AddressBook>,
        config: Option<&PlanConfig>,
    ) -> Result<PlanOutcome, IntentError> {
        let defaults = &self.config.plan_defaults;
        let inherited = match config {
            Some(overrides) => overrides.evm.inherited(&defaults.evm),
            None => defaults.evm.clone(),
        };
        inherited.check_addresses().map_err(|e| match e {
            IntentError::InvalidRequest(msg) => IntentError::Configuration(format!("plan defaults: {}", msg)),
            other => other,
        })?;

        let config = match config {
            Some(overrides) => overrides.overlay(defaults),
            None => defaults.clone(),
        };
        let ctx = PlanContext {
            registry: registry.unwrap_or(self.registry.as_ref()),
            address_book: address_book.unwrap_or(self.address_book.as_ref()),
            config: &config,
        };
        self.planner.plan(intent, &ctx).await
    }
}
