//! Backend registry for runtime backend discovery and instantiation
//!
//! The registry manages available backends and provides factory methods
//! to create configured backend instances. Backends are registered at
//! compile time via feature flags.

use std::collections::HashMap;

use super::{BackendError, BackendInfo, GenerationBackend};
use crate::config::BackendConfig;

#[cfg(feature = "backend-gemini")]
use super::GeminiBackend;

#[cfg(feature = "backend-openai-compat")]
use super::OpenAiCompatBackend;

/// Factory trait for creating backend instances
pub trait BackendFactory: Send + Sync {
    /// Create a new backend instance from configuration
    fn create(&self, config: &BackendConfig) -> Result<Box<dyn GenerationBackend>, BackendError>;

    /// Get information about this backend
    fn info(&self) -> BackendInfo;
}

/// Factory for the Gemini backend
#[cfg(feature = "backend-gemini")]
pub struct GeminiFactory;

#[cfg(feature = "backend-gemini")]
impl BackendFactory for GeminiFactory {
    fn create(&self, config: &BackendConfig) -> Result<Box<dyn GenerationBackend>, BackendError> {
        Ok(Box::new(GeminiBackend::new(config)))
    }

    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: "gemini".to_string(),
            description: "Google Gemini generateContent API".to_string(),
            capabilities: GeminiBackend::static_capabilities(),
            active: false,
        }
    }
}

/// Factory for the OpenAI-compatible backend
#[cfg(feature = "backend-openai-compat")]
pub struct OpenAiCompatFactory;

#[cfg(feature = "backend-openai-compat")]
impl BackendFactory for OpenAiCompatFactory {
    fn create(&self, config: &BackendConfig) -> Result<Box<dyn GenerationBackend>, BackendError> {
        Ok(Box::new(OpenAiCompatBackend::new(config)))
    }

    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: "openai-compat".to_string(),
            description: "OpenAI-compatible chat completions server".to_string(),
            capabilities: OpenAiCompatBackend::static_capabilities(),
            active: false,
        }
    }
}

/// Registry of available backends
pub struct BackendRegistry {
    factories: HashMap<String, Box<dyn BackendFactory>>,
}

impl BackendRegistry {
    /// Create a registry with every backend enabled at compile time
    pub fn new() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self {
            factories: HashMap::new(),
        };

        #[cfg(feature = "backend-gemini")]
        registry.register("gemini", Box::new(GeminiFactory));

        #[cfg(feature = "backend-openai-compat")]
        registry.register("openai-compat", Box::new(OpenAiCompatFactory));

        registry
    }

    /// Register a backend factory under a name, replacing any previous one
    pub fn register(&mut self, name: &str, factory: Box<dyn BackendFactory>) {
        self.factories.insert(name.to_string(), factory);
    }

    /// Create a backend instance by name
    pub fn create(
        &self,
        name: &str,
        config: &BackendConfig,
    ) -> Result<Box<dyn GenerationBackend>, BackendError> {
        self.factories
            .get(name)
            .ok_or_else(|| BackendError::Config(format!("Unknown backend: {}", name)))?
            .create(config)
    }

    /// Information about all registered backends, sorted by name
    pub fn list(&self) -> Vec<BackendInfo> {
        let mut infos: Vec<BackendInfo> = self.factories.values().map(|f| f.info()).collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Registered backend names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backends_registered() {
        let registry = BackendRegistry::new();
        assert_eq!(registry.names(), vec!["gemini", "openai-compat"]);
        assert!(registry.contains("gemini"));
    }

    #[test]
    fn test_create_by_name() {
        let registry = BackendRegistry::new();
        let backend = registry
            .create("gemini", &BackendConfig::with_api_key("k"))
            .unwrap();
        assert_eq!(backend.name(), "gemini");
        assert!(backend.is_configured());
    }

    #[test]
    fn test_unknown_backend() {
        let registry = BackendRegistry::new();
        let result = registry.create("unknown-backend", &BackendConfig::default());
        assert!(matches!(result, Err(BackendError::Config(_))));
    }

    #[test]
    fn test_list_info() {
        let infos = BackendRegistry::new().list();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].name, "gemini");
        assert!(infos[0].capabilities.thinking_budget);
        assert!(infos.iter().all(|info| !info.active));
    }
}
