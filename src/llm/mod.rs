//! LLM collaborator used by the instruction requestor
//!
//! The query generator only sees [`LlmClient::complete`]. Each provider gets
//! its own adapter so that message-role conventions (Anthropic takes the
//! system prompt as a separate field) stay out of the generation loop.

#[cfg(test)]
pub(crate) mod mock;
mod anthropic;
mod openai;
pub mod provider;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiClient;
pub use provider::Provider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::ApiConfig;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Request failed: {0}")]
    Http(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Chat completion capability consumed by the query generator
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], temperature: f32)
        -> Result<String, LlmError>;

    fn model(&self) -> &str;
}

/// Build the adapter matching the configured provider
pub fn build_client(config: &ApiConfig) -> Result<Box<dyn LlmClient>, LlmError> {
    let provider = Provider::parse(&config.source)
        .ok_or_else(|| LlmError::Config(format!("Unsupported provider: {}", config.source)))?;

    if config.api_key.is_empty() {
        return Err(LlmError::Config("API key not configured".to_string()));
    }

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.model_parameters.timeout))
        .build()
        .map_err(|e| LlmError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let endpoint = provider.endpoint(config.api_base.as_deref());
    info!(
        "LLM client: provider={} model={} endpoint={}",
        provider, config.model, endpoint
    );

    let client: Box<dyn LlmClient> = match provider {
        Provider::OpenAI => Box::new(OpenAiClient::new(
            http,
            endpoint,
            config.api_key.clone(),
            config.model.clone(),
            config.model_parameters.max_tokens,
        )),
        Provider::Anthropic => Box::new(AnthropicClient::new(
            http,
            endpoint,
            config.api_key.clone(),
            config.model.clone(),
            config.model_parameters.max_tokens,
        )),
    };
    Ok(client)
}

/// Map a non-success HTTP response to an error with a truncated body
async fn error_for_status(response: reqwest::Response) -> LlmError {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return LlmError::RateLimited;
    }
    let body = response.text().await.unwrap_or_default();
    let body = body
        .chars()
        .take(500)
        .collect::<String>()
        .replace(|c: char| !c.is_ascii_graphic() && c != ' ', "");
    LlmError::Status {
        status: status.as_u16(),
        body,
    }
}
