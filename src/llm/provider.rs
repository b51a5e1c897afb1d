//! Supported LLM providers

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    OpenAI,
    Anthropic,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::OpenAI, Provider::Anthropic];

    /// Parse the `SOURCE` value of an API configuration
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "OpenAI" => Some(Provider::OpenAI),
            "Anthropic" => Some(Provider::Anthropic),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Anthropic => "Anthropic",
        }
    }

    /// Base URL used when the configuration has no `API_BASE`
    pub fn default_api_base(&self) -> &'static str {
        match self {
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::Anthropic => "https://api.anthropic.com/v1",
        }
    }

    /// Request path appended to the API base
    pub fn request_path(&self) -> &'static str {
        match self {
            Provider::OpenAI => "/chat/completions",
            Provider::Anthropic => "/messages",
        }
    }

    pub fn endpoint(&self, api_base: Option<&str>) -> String {
        let base = api_base.unwrap_or(self.default_api_base());
        format!("{}{}", base.trim_end_matches('/'), self.request_path())
    }

    /// Models the pipeline has been exercised with
    pub fn known_models(&self) -> &'static [&'static str] {
        match self {
            Provider::OpenAI => &["gpt-4o-2024-05-13", "gpt-4-turbo", "gpt-4", "gpt-3.5-turbo"],
            Provider::Anthropic => &[
                "claude-3-sonnet-20240229",
                "claude-3-haiku-20240307",
                "claude-3-opus-20240229",
                "claude-2.1",
                "claude-2",
            ],
        }
    }

    /// Expected shape of an API key for this provider
    pub fn api_key_pattern(&self) -> &'static str {
        match self {
            Provider::OpenAI => r"^sk-[A-Za-z0-9]{48,}$",
            Provider::Anthropic => r"^sk-ant-[A-Za-z0-9\-_]{95,}$",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Provider::parse("OpenAI"), Some(Provider::OpenAI));
        assert_eq!(Provider::parse(" Anthropic "), Some(Provider::Anthropic));
        assert_eq!(Provider::parse("openai"), None);
        assert_eq!(Provider::parse("Cohere"), None);
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            Provider::OpenAI.endpoint(None),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            Provider::Anthropic.endpoint(Some("http://127.0.0.1:9000/v1/")),
            "http://127.0.0.1:9000/v1/messages"
        );
    }

    #[test]
    fn test_key_patterns_compile() {
        for provider in Provider::ALL {
            assert!(regex::Regex::new(provider.api_key_pattern()).is_ok());
        }
    }
}
