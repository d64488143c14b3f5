//! Chat-completion client.
//!
//! Thin client for an OpenAI-compatible `/chat/completions` endpoint.
//! Page inference and chunk expansion both go through this; the request
//! is always a single user message at temperature 0 so responses stay
//! reproducible enough to parse.

use serde::{Deserialize, Serialize};

use crate::core::clients::build_http_client;
use crate::core::config::ServicesConfig;
use crate::core::error::{IngestError, Result};

/// Client for an OpenAI-style chat-completion endpoint
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl CompletionClient {
    /// Create a completion client from service configuration.
    pub fn new(config: &ServicesConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
            url: config.completion_url.clone(),
            model: config.completion_model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Send a single-message prompt and return the model's reply text.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        };

        let mut builder = self.client.post(&self.url).json(&request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| IngestError::Completion(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::Completion(format!(
                "Endpoint returned {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| IngestError::Completion(format!("Malformed response: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| IngestError::Completion("Response contained no choices".to_string()))?;

        Ok(content)
    }
}
