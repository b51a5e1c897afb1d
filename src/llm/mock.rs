//! Scripted collaborator for unit tests

use async_trait::async_trait;
use std::sync::Mutex;

use super::{ChatMessage, LlmClient, LlmError};

/// Replays canned responses, one per call, and records every prompt
pub(crate) struct ScriptedClient {
    responses: Mutex<Vec<Result<String, LlmError>>>,
    prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedClient {
    pub(crate) fn new(mut responses: Vec<Result<String, LlmError>>) -> Self {
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answers every call with the same issue
    pub(crate) fn always(issue: &str, calls: usize) -> Self {
        let body = serde_json::json!({ "issue": issue }).to_string();
        Self::new((0..calls).map(|_| Ok(body.clone())).collect())
    }

    pub(crate) fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub(crate) fn prompts(&self) -> Vec<Vec<ChatMessage>> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _temperature: f32,
    ) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(LlmError::Http("script exhausted".to_string())))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
