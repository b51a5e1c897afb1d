//! Anthropic messages adapter
//!
//! The messages API takes the system prompt as a top-level `system` field,
//! so system-role messages are lifted out of the conversation here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{error_for_status, ChatMessage, LlmClient, LlmError, Role};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "String::is_empty")]
    system: String,
    messages: Vec<&'a ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

pub struct AnthropicClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(
        http: reqwest::Client,
        endpoint: String,
        api_key: String,
        model: String,
        max_tokens: u32,
    ) -> Self {
        Self {
            http,
            endpoint,
            api_key,
            model,
            max_tokens,
        }
    }

    fn build_request<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        temperature: f32,
    ) -> MessagesRequest<'a> {
        let system = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        MessagesRequest {
            model: &self.model,
            system,
            messages: messages.iter().filter(|m| m.role != Role::System).collect(),
            temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, LlmError> {
        debug!("Calling Anthropic at {} ({} messages)", self.endpoint, messages.len());

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&self.build_request(messages, temperature))
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        body.content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| {
                LlmError::InvalidResponse("No text content in Anthropic response".to_string())
            })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
