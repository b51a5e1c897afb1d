//! Pipeline Configuration
//!
//! Defines the configuration consumed by the query generator:
//! - API configuration (provider, model, credential, model parameters)
//! - Generation settings (datasets, seed, time zone, retry budget)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::util::env::resolve_or_empty;

/// LLM provider configuration, as written in the API config YAML
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Provider name (`OpenAI` or `Anthropic`)
    #[serde(rename = "SOURCE")]
    pub source: String,
    #[serde(rename = "MODEL")]
    pub model: String,
    /// Literal key or `${ENV_VAR}` reference
    #[serde(rename = "API_KEY", default)]
    pub api_key: String,
    /// Overrides the provider's default base URL
    #[serde(rename = "API_BASE", default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(rename = "MODEL_PARAMETERS", default)]
    pub model_parameters: ModelParameters,
}

// Custom Debug implementation that redacts the API key
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("source", &self.source)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model_parameters", &self.model_parameters)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParameters {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_timeout() -> u64 {
    60
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: None,
            timeout: default_timeout(),
        }
    }
}

impl ApiConfig {
    /// Load from YAML and resolve a `${VAR}` API key from the environment.
    /// An unset variable resolves to an empty key.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read API config {}", path.display()))?;
        Self::from_yaml(&text)
            .with_context(|| format!("Failed to parse API config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let mut config: ApiConfig = serde_yaml::from_str(text)?;
        config.api_key = resolve_or_empty(&config.api_key);
        Ok(config)
    }
}

/// One ground-truth dataset to generate queries for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSpec {
    /// Dataset name, may contain `/` for sub-datasets (`Market/cloudbed-1`)
    pub name: String,
    /// Record file, relative to the dataset root
    pub record_path: PathBuf,
    /// Extra bullet appended to the known-input block
    #[serde(default)]
    pub extra_spec: Option<String>,
}

impl DatasetSpec {
    pub fn new(name: &str, extra_spec: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            record_path: Path::new(name).join("record.csv"),
            extra_spec: extra_spec.map(String::from),
        }
    }

    /// File name of the generated query table
    pub fn output_file_name(&self) -> String {
        format!("{}_query.csv", self.name.replace('/', "_"))
    }

    /// The OpenRCA datasets, in processing order
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("Telecom", None),
            Self::new("Bank", None),
            Self::new("Market/cloudbed-1", Some("system: cloudbed-1")),
            Self::new("Market/cloudbed-2", Some("system: cloudbed-2")),
        ]
    }
}

/// Settings for a query generation run
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub datasets: Vec<DatasetSpec>,
    /// Seed for task-type selection
    pub seed: u64,
    /// Offset of the wall-clock time zone, in minutes east of UTC
    pub utc_offset_minutes: i32,
    pub temperature: f32,
    pub max_attempts: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            datasets: DatasetSpec::defaults(),
            seed: 42,
            utc_offset_minutes: 8 * 60,
            temperature: 1.0,
            max_attempts: 3,
        }
    }
}
