use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{BillParser, ExtractError, ExtractedBill};
use crate::config::ExtractionConfig;

const SYSTEM_PROMPT: &str = "You read electricity bills. Reply with one JSON object \
     {\"date\": \"YYYY-MM-DD\", \"amount\": number, \"kwh_used\": number} where date is the \
     statement date, amount the total due in dollars and kwh_used the billed usage. \
     Use null for anything not on the bill. No other text.";

/// Bill parser backed by an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiBillParser {
    base_url: String,
    model: String,
    api_key: String,
    client: Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiBillParser {
    pub fn new(cfg: &ExtractionConfig, api_key: String) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| ExtractError::Client(e.to_string()))?;
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            api_key,
            client,
        })
    }

    /// Reads the key from the variable named by `cfg.api_key_env`.
    pub fn from_env(cfg: &ExtractionConfig) -> Result<Self, ExtractError> {
        let api_key = std::env::var(&cfg.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ExtractError::MissingKey(cfg.api_key_env.clone()))?;
        Self::new(cfg, api_key)
    }
}

/// Models sometimes wrap the object in a ```json fence.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[async_trait::async_trait]
impl BillParser for OpenAiBillParser {
    async fn parse_bill(&self, text: &str) -> Result<ExtractedBill, ExtractError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            messages: [
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: text },
            ],
        };

        tracing::debug!(model = %self.model, chars = text.len(), "sending bill text to parser");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractError::Status { status: status.as_u16(), body });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::Decode(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ExtractError::Decode("response has no message content".into()))?;

        serde_json::from_str(strip_code_fence(&content))
            .map_err(|e| ExtractError::Decode(format!("{e}: {content}")))
    }
}
