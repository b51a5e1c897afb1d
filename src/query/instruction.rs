//! Instruction requests
//!
//! Builds the `known` and `query` specification blocks for a record, wraps
//! them in the prompt pair and asks the LLM for an issue description.

use tracing::debug;

use super::prompts::{SYSTEM_PROMPT, USER_PROMPT};
use crate::error::{QueryError, Result};
use crate::llm::{ChatMessage, LlmClient};
use crate::util::retry::retry_bounded;
use crate::util::template::{render, TemplateError, TemplateVars};

/// Placeholder for every field the solver has to find
pub const UNKNOWN: &str = "**UNKNOWN**";

/// Default number of attempts per record
pub const MAX_ATTEMPTS: u32 = 3;

fn fenced(tag: &str, bullets: &[String]) -> String {
    let mut body = format!("```{}\n", tag);
    for bullet in bullets {
        body.push_str("- ");
        body.push_str(bullet);
        body.push('\n');
    }
    format!("{}\n```", body.trim())
}

/// The `known` block: input templates rendered with `num` and `time_period`,
/// followed by the optional extra line
pub fn input_specification(
    templates: &[String],
    num: usize,
    time_period: &str,
    extra_spec: Option<&str>,
) -> std::result::Result<String, TemplateError> {
    let vars = TemplateVars::new()
        .with("num", num)
        .with("time_period", time_period);
    let mut bullets = templates
        .iter()
        .map(|t| render(t, &vars))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    if let Some(extra) = extra_spec {
        bullets.push(extra.to_string());
    }
    Ok(fenced("known", &bullets))
}

/// The `query` block: output templates with every answer field hidden
pub fn output_specification(templates: &[String]) -> std::result::Result<String, TemplateError> {
    let vars = TemplateVars::new()
        .with("time_period", UNKNOWN)
        .with("datetime", UNKNOWN)
        .with("component", UNKNOWN)
        .with("reason", UNKNOWN);
    let bullets = templates
        .iter()
        .map(|t| render(t, &vars))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(fenced("query", &bullets))
}

pub fn build_prompt(
    input_specification: &str,
    output_specification: &str,
) -> std::result::Result<Vec<ChatMessage>, TemplateError> {
    let vars = TemplateVars::new()
        .with("input_specification", input_specification)
        .with("output_specification", output_specification);
    Ok(vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(render(USER_PROMPT, &vars)?),
    ])
}

/// Extract the `issue` text from an LLM response.
///
/// The response is parsed as-is first; only when that fails is a surrounding
/// markdown code fence stripped. A missing, non-string or empty `issue` is
/// an error.
pub fn parse_issue(response: &str) -> Result<String> {
    let value: serde_json::Value = match serde_json::from_str(response.trim()) {
        Ok(value) => value,
        Err(e) => unfenced(response)
            .and_then(|inner| serde_json::from_str::<serde_json::Value>(inner.trim()).ok())
            .ok_or_else(|| QueryError::MalformedResponse(format!("not valid JSON: {}", e)))?,
    };

    match value.get("issue").and_then(|v| v.as_str()) {
        Some(issue) if !issue.trim().is_empty() => Ok(issue.to_string()),
        Some(_) => Err(QueryError::MalformedResponse("empty 'issue' field".to_string())),
        None => Err(QueryError::MalformedResponse(
            "missing string field 'issue'".to_string(),
        )),
    }
}

fn unfenced(response: &str) -> Option<&str> {
    if let Some((_, rest)) = response.split_once("```json") {
        rest.split("```").next()
    } else {
        response.split("```").nth(1)
    }
}

/// Asks the collaborator for an instruction, retrying without backoff
pub struct InstructionRequestor<'a> {
    client: &'a dyn LlmClient,
    temperature: f32,
    max_attempts: u32,
}

impl<'a> InstructionRequestor<'a> {
    pub fn new(client: &'a dyn LlmClient, temperature: f32, max_attempts: u32) -> Self {
        Self {
            client,
            temperature,
            max_attempts,
        }
    }

    /// Returns the instruction text, or `GenerationFailure` once every
    /// attempt has failed
    pub async fn request(&self, prompt: &[ChatMessage]) -> Result<String> {
        retry_bounded(self.max_attempts, |attempt| async move {
            debug!("Instruction attempt {}/{}", attempt, self.max_attempts);
            let response = self.client.complete(prompt, self.temperature).await?;
            parse_issue(&response)
        })
        .await
        .map_err(|exhausted| QueryError::GenerationFailure {
            attempts: exhausted.attempts,
            last_error: exhausted.last_error.to_string(),
        })
    }
}
