//! Configuration types for the inference library

use serde::{Deserialize, Serialize};

use crate::constants::defaults;

/// Connection settings for one backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// API base URL; the backend's public endpoint when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Model identifier (e.g., "gemini-3-pro-preview", "openai/gpt-4o")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// API key sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl BackendConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Base URL without a trailing slash, falling back to `default`
    pub fn base_url_or(&self, default: &str) -> String {
        self.base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }

    /// Configured model, falling back to `default`
    pub fn model_or(&self, default: &str) -> String {
        self.model
            .as_deref()
            .filter(|model| !model.trim().is_empty())
            .unwrap_or(default)
            .to_string()
    }

    /// API key if present and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }
}

/// Sampling parameters sent with every generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Reasoning token budget (None leaves the model default)
    #[serde(default = "default_thinking_budget")]
    pub thinking_budget: Option<u32>,
    /// Output length cap (None leaves the model default)
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    defaults::TEMPERATURE
}

fn default_thinking_budget() -> Option<u32> {
    Some(defaults::THINKING_BUDGET)
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            thinking_budget: default_thinking_budget(),
            max_output_tokens: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = GenerationParams::default();
        assert_eq!(params.temperature, 0.4);
        assert_eq!(params.thinking_budget, Some(4096));
        assert_eq!(params.max_output_tokens, None);
    }

    #[test]
    fn test_params_fill_missing_fields() {
        let params: GenerationParams = serde_json::from_str(r#"{"temperature": 0.9}"#).unwrap();
        assert_eq!(params.temperature, 0.9);
        assert_eq!(params.thinking_budget, Some(4096));
    }

    #[test]
    fn test_backend_config_fallbacks() {
        let config = BackendConfig {
            base_url: Some("http://localhost:1234/".to_string()),
            model: Some("  ".to_string()),
            api_key: Some("".to_string()),
        };
        assert_eq!(config.base_url_or("https://x"), "http://localhost:1234");
        assert_eq!(config.model_or("default-model"), "default-model");
        assert!(config.api_key().is_none());

        let empty = BackendConfig::default();
        assert_eq!(empty.base_url_or("https://x/"), "https://x");
    }
}
