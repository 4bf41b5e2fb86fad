// src/classifier/anthropic.rs

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{intent_from_arguments, user_prompt, Classifier, SYSTEM_PROMPT};
use crate::config::LlmConfig;
use crate::error::IntentError;
use crate::intent::schema::{INTENT_SCHEMA, INTENT_TOOL_DESCRIPTION, INTENT_TOOL_NAME};
use crate::intent::Intent;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// Anthropic Messages API with a forced `tool_use`.
pub struct AnthropicClassifier {
    http: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl AnthropicClassifier {
    pub fn new(http: Client, cfg: &LlmConfig) -> Self {
        AnthropicClassifier {
            http,
            base_url: cfg.base_url.clone(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        }
    }

    fn request_body(&self, text: &str, available_assets: &Value) -> Value {
        json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "system": SYSTEM_PROMPT,
            "messages": [
                {"role": "user", "content": user_prompt(text, available_assets)}
            ],
            "tools": [{
                "name": INTENT_TOOL_NAME,
                "description": INTENT_TOOL_DESCRIPTION,
                "input_schema": INTENT_SCHEMA.clone()
            }],
            "tool_choice": {"type": "tool", "name": INTENT_TOOL_NAME}
        })
    }
}

fn extract_tool_input(response: &Value) -> Result<Value, IntentError> {
    response["content"]
        .as_array()
        .and_then(|blocks| blocks.iter().find(|b| b["type"] == "tool_use"))
        .map(|block| block["input"].clone())
        .ok_or_else(|| IntentError::Classification("no structured intent produced (no tool_use block)".to_string()))
}

#[async_trait]
impl Classifier for AnthropicClassifier {
    fn provider(&self) -> &str {
        "claude"
    }

    async fn classify(&self, text: &str, available_assets: &Value) -> Result<Intent, IntentError> {
        let request_id = Uuid::new_v4();
        info!(%request_id, provider = "claude", model = %self.model, "classifying intent");

        let resp = self
            .http
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.request_body(text, available_assets))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            warn!(%request_id, status = status.as_u16(), "LLM provider returned an error");
            return Err(IntentError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let data: Value = serde_json::from_str(&body)
            .map_err(|e| IntentError::Classification(format!("provider reply is not JSON: {}", e)))?;
        let intent = intent_from_arguments(extract_tool_input(&data)?)?;
        debug!(%request_id, kind = intent.kind(), "intent classified");
        Ok(intent)
    }
}
