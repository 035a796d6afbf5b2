//! Multimodal generation library
//!
//! This library provides a unified interface for hosted generation APIs:
//! - **Gemini**: Google's `generateContent` endpoint (default)
//! - **OpenAI-compatible**: any `/v1/chat/completions` server (OpenRouter, LM Studio, Ollama, ...)
//!
//! Application code talks only to [`GenerationGateway`], which owns the active
//! backend and applies timeouts and cancellation to every call.
//!
//! # Example
//!
//! ```rust,ignore
//! use inference::{BackendConfig, GenerationGateway, GenerationRequest};
//! use tokio_util::sync::CancellationToken;
//!
//! let gateway = GenerationGateway::new();
//! gateway.switch_backend("gemini", &BackendConfig::with_api_key(key)).await?;
//!
//! let request = GenerationRequest::new(messages, SYSTEM_INSTRUCTION);
//! let reply = gateway.generate(&request, &CancellationToken::new()).await?;
//! ```

pub mod backend;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod types;

// Re-exports for convenience
pub use backend::{
    BackendCapabilities, BackendError, BackendFactory, BackendInfo, BackendRegistry,
    GenerationBackend,
};

#[cfg(feature = "backend-gemini")]
pub use backend::GeminiBackend;

#[cfg(feature = "backend-openai-compat")]
pub use backend::OpenAiCompatBackend;

pub use config::{BackendConfig, GenerationParams};
pub use gateway::{GatewayError, GenerationGateway, SharedGateway};
pub use types::GenerationRequest;
