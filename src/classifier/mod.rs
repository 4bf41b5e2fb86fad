// src/classifier/mod.rs

//! Free text to typed [`Intent`] through a hosted model's forced tool call.
//!
//! Every strategy sends the same system prompt, the same user message shape
//! and the same single tool schema, and makes exactly one round-trip. The
//! strategy is picked once from [`Config`](crate::config::Config) and
//! injected into the application state.

pub mod anthropic;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::{LlmConfig, LlmProvider};
use crate::error::IntentError;
use crate::intent::Intent;

pub use anthropic::AnthropicClassifier;
pub use openai::OpenAiClassifier;

pub const SYSTEM_PROMPT: &str = "You are a crypto wallet intent parser. Return exactly one tool call.";

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Short provider name for logs.
    fn provider(&self) -> &str;

    async fn classify(&self, text: &str, available_assets: &Value) -> Result<Intent, IntentError>;
}

pub fn user_prompt(text: &str, available_assets: &Value) -> String {
    let assets = serde_json::to_string_pretty(available_assets).unwrap_or_else(|_| "{}".to_string());
    format!("Text: {}\nSupported: {}", text, assets)
}

/// Parse tool-call arguments. Anything the model produced that is not a
/// valid intent is a classification failure, not a caller error.
pub fn intent_from_arguments(arguments: Value) -> Result<Intent, IntentError> {
    Intent::from_value(arguments).map_err(|e| match e {
        IntentError::UnsupportedIntent(t) => {
            IntentError::Classification(format!("model produced unsupported intent type: {}", t))
        }
        IntentError::InvalidIntent(msg) => {
            IntentError::Classification(format!("model produced an invalid intent: {}", msg))
        }
        other => other,
    })
}

/// Stand-in used when no provider key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredClassifier;

#[async_trait]
impl Classifier for UnconfiguredClassifier {
    fn provider(&self) -> &str {
        "none"
    }

    async fn classify(&self, _text: &str, _available_assets: &Value) -> Result<Intent, IntentError> {
        Err(IntentError::Configuration(
            "no LLM API key configured (set OPENAI_API_KEY, GEMINI_API_KEY or CLAUDE_API_KEY)".to_string(),
        ))
    }
}

/// Build the strategy for the resolved configuration.
pub fn from_config(llm: Option<&LlmConfig>, http: Client) -> Arc<dyn Classifier> {
    match llm {
        None => Arc::new(UnconfiguredClassifier),
        Some(cfg) => match cfg.provider {
            LlmProvider::OpenAi | LlmProvider::Gemini => Arc::new(OpenAiClassifier::new(http, cfg)),
            LlmProvider::Claude => Arc::new(AnthropicClassifier::new(http, cfg)),
        },
    }
}
