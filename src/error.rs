//! Error types for the query generation pipeline

use thiserror::Error;

use crate::llm::LlmError;
use crate::util::template::TemplateError;

/// Result type alias
pub type Result<T> = std::result::Result<T, QueryError>;

/// Query generation error types
///
/// `InvalidInput` aborts the whole dataset. Every other variant is scoped to
/// a single ground-truth record and ends up in that dataset's error list.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Template render error: {0}")]
    TemplateRender(#[from] TemplateError),

    #[error("Generation failed after {attempts} attempts: {last_error}")]
    GenerationFailure { attempts: u32, last_error: String },

    #[error("LLM collaborator error: {0}")]
    Collaborator(#[from] LlmError),

    #[error("Malformed LLM response: {0}")]
    MalformedResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl QueryError {
    /// True when the error is scoped to a single record and the scan may go on
    pub fn is_record_scoped(&self) -> bool {
        matches!(
            self,
            QueryError::TemplateRender(_)
                | QueryError::GenerationFailure { .. }
                | QueryError::Collaborator(_)
                | QueryError::MalformedResponse(_)
        )
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::Serialization(err.to_string())
    }
}
