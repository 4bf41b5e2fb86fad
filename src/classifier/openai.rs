// src/classifier/openai.rs

//! OpenAI chat-completions wire format. Gemini is served through its
//! OpenAI-compatible endpoint with the same code.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{intent_from_arguments, user_prompt, Classifier, SYSTEM_PROMPT};
use crate::config::{LlmConfig, LlmProvider};
use crate::error::IntentError;
use crate::intent::schema::{INTENT_SCHEMA, INTENT_TOOL_DESCRIPTION, INTENT_TOOL_NAME};
use crate::intent::Intent;

pub struct OpenAiClassifier {
    http: Client,
    provider: LlmProvider,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl OpenAiClassifier {
    pub fn new(http: Client, cfg: &LlmConfig) -> Self {
        OpenAiClassifier {
            http,
            provider: cfg.provider,
            base_url: cfg.base_url.clone(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        }
    }

    fn request_body(&self, text: &str, available_assets: &Value) -> Value {
        json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_prompt(text, available_assets)}
            ],
            "tools": [{
                "type": "function",
                "function": {
                    "name": INTENT_TOOL_NAME,
                    "description": INTENT_TOOL_DESCRIPTION,
                    "parameters": INTENT_SCHEMA.clone()
                }
            }],
            "tool_choice": {"type": "function", "function": {"name": INTENT_TOOL_NAME}}
        })
    }
}

/// First tool call's `arguments`, which the API returns as a JSON string.
fn extract_arguments(response: &Value) -> Result<Value, IntentError> {
    let call = response["choices"]
        .get(0)
        .and_then(|c| c["message"]["tool_calls"].get(0))
        .ok_or_else(|| IntentError::Classification("no structured intent produced (no tool call)".to_string()))?;

    match &call["function"]["arguments"] {
        Value::String(raw) => serde_json::from_str(raw)
            .map_err(|e| IntentError::Classification(format!("tool call arguments are not JSON: {}", e))),
        Value::Object(_) => Ok(call["function"]["arguments"].clone()),
        _ => Err(IntentError::Classification("tool call carries no arguments".to_string())),
    }
}

#[async_trait]
impl Classifier for OpenAiClassifier {
    fn provider(&self) -> &str {
        self.provider.as_str()
    }

    async fn classify(&self, text: &str, available_assets: &Value) -> Result<Intent, IntentError> {
        let request_id = Uuid::new_v4();
        info!(%request_id, provider = self.provider(), model = %self.model, "classifying intent");

        let url = format!("{}/chat/completions", self.base_url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
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
        let intent = intent_from_arguments(extract_arguments(&data)?)?;
        debug!(%request_id, kind = intent.kind(), "intent classified");
        Ok(intent)
    }
}
