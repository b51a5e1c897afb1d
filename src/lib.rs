//! OpenRCA benchmark preparation pipeline
//!
//! Three offline stages feed the OpenRCA root cause analysis benchmark:
//!
//! - `validation::dataset`: checks a downloaded dataset tree against its
//!   `sources.json` manifest
//! - `validation::api_config`: checks an LLM API configuration without
//!   calling the provider and writes an env-substituted copy
//! - `query`: turns ground-truth failure records into benchmark queries with
//!   scoring rubrics, using an LLM to phrase each instruction
//!
//! Every stage reports a [`RunStatus`] whose exit code is `0` on success,
//! `2` on partial success and `1` on failure.

pub mod config;
pub mod error;
pub mod llm;
pub mod query;
pub mod status;
pub mod util;
pub mod validation;

pub use config::{ApiConfig, DatasetSpec, GeneratorConfig, ModelParameters};
pub use error::{QueryError, Result};
pub use llm::{build_client, ChatMessage, LlmClient, LlmError, Provider};
pub use query::{GenerationReport, QueryGenerator, TaskCatalog};
pub use status::RunStatus;
