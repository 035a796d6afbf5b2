//! Pluggable generation backend abstraction
//!
//! This module provides a trait-based abstraction over hosted generation APIs
//! (Gemini, OpenAI-compatible servers). All backends implement the same
//! interface, allowing runtime switching between providers.

pub mod registry;

#[cfg(feature = "backend-gemini")]
pub mod gemini;

#[cfg(feature = "backend-openai-compat")]
pub mod openai_compat;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::GenerationRequest;

#[cfg(feature = "backend-gemini")]
pub use gemini::GeminiBackend;

#[cfg(feature = "backend-openai-compat")]
pub use openai_compat::OpenAiCompatBackend;

pub use registry::{BackendFactory, BackendRegistry};

/// Error types for backend operations
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Capabilities that a backend may or may not support
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BackendCapabilities {
    /// Accepts inline images alongside text
    pub vision: bool,
    /// Honors a reasoning token budget
    pub thinking_budget: bool,
    /// Has a dedicated system instruction field
    pub system_instruction: bool,
}

/// Backend information for UI display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendInfo {
    /// Backend identifier (e.g., "gemini", "openai-compat")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Backend capabilities
    pub capabilities: BackendCapabilities,
    /// Whether this backend is currently active
    pub active: bool,
}

/// The core trait that all generation backends must implement.
///
/// A backend is configured when it is constructed. `generate` turns one
/// serialized conversation into the model's raw reply text.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Registry identifier
    fn name(&self) -> &'static str;

    /// Description of this backend
    fn description(&self) -> &'static str;

    /// What this backend supports
    fn capabilities(&self) -> BackendCapabilities;

    /// Model the backend sends requests to
    fn model(&self) -> String;

    /// Does the backend have everything it needs (e.g., an API key)?
    fn is_configured(&self) -> bool;

    /// Run one generation call and return the raw reply text
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError>;
}

/// Turn a non-success HTTP response into `BackendError::Api`
pub(crate) async fn error_for_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, BackendError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Api { status, body })
}

/// Shared HTTP client settings for hosted APIs
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(
            crate::constants::timeouts::CONNECT_SECS,
        ))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
}
