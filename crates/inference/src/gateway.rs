//! Generation Gateway - Single entry point for all generation calls
//!
//! The gateway abstracts over the hosted backends (Gemini, OpenAI-compatible)
//! and gives the rest of the application one place to issue a request with a
//! deadline and a cancellation token. It also owns backend switching.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::backend::{BackendError, BackendInfo, BackendRegistry, GenerationBackend};
use crate::config::BackendConfig;
use crate::constants::timeouts;
use crate::types::GenerationRequest;

#[cfg(feature = "backend-gemini")]
use crate::backend::GeminiBackend;

/// Error types for gateway operations
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Generation cancelled")]
    Cancelled,

    #[error("Backend switch failed: {0}")]
    SwitchFailed(String),
}

/// The single entry point for ALL generation calls.
///
/// Application code should only interact with `GenerationGateway`, never
/// with backends directly.
pub struct GenerationGateway {
    /// The currently active backend. Calls clone the inner `Arc`, so a
    /// switch never waits on an in-flight generation.
    backend: Arc<RwLock<Arc<dyn GenerationBackend>>>,
    /// Registry of available backends
    registry: BackendRegistry,
    /// Name of the current backend
    current_backend_name: Arc<RwLock<String>>,
    /// Deadline for a single generation call
    timeout: Duration,
}

impl GenerationGateway {
    /// Create a new gateway with an unconfigured Gemini backend
    #[cfg(feature = "backend-gemini")]
    pub fn new() -> Self {
        Self::with_backend(
            Box::new(GeminiBackend::new(&BackendConfig::default())),
            "gemini",
        )
    }

    /// Create a new gateway with a specific backend
    pub fn with_backend(backend: Box<dyn GenerationBackend>, name: &str) -> Self {
        Self {
            backend: Arc::new(RwLock::new(Arc::from(backend))),
            registry: BackendRegistry::new(),
            current_backend_name: Arc::new(RwLock::new(name.to_string())),
            timeout: Duration::from_secs(timeouts::GENERATION_SECS),
        }
    }

    /// Build a gateway from a registry name and its configuration
    pub fn from_config(name: &str, config: &BackendConfig) -> Result<Self, GatewayError> {
        let backend = BackendRegistry::new()
            .create(name, config)
            .map_err(|e| GatewayError::SwitchFailed(e.to_string()))?;
        Ok(Self::with_backend(backend, name))
    }

    /// Override the per-call deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the registry for backend information
    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Get the name of the currently active backend
    pub async fn current_backend_name(&self) -> String {
        self.current_backend_name.read().await.clone()
    }

    /// Switch to a different backend
    ///
    /// The new backend is created first, so an unknown name leaves the
    /// current backend in place.
    pub async fn switch_backend(
        &self,
        name: &str,
        config: &BackendConfig,
    ) -> Result<(), GatewayError> {
        let new_backend = self
            .registry
            .create(name, config)
            .map_err(|e| GatewayError::SwitchFailed(e.to_string()))?;

        {
            let mut guard = self.backend.write().await;
            *guard = Arc::from(new_backend);
        }

        {
            let mut name_guard = self.current_backend_name.write().await;
            *name_guard = name.to_string();
        }

        log::info!("Switched to backend: {}", name);
        Ok(())
    }

    /// List all available backends, marking the active one
    pub async fn available_backends(&self) -> Vec<BackendInfo> {
        let current = self.current_backend_name().await;
        self.registry
            .list()
            .into_iter()
            .map(|mut info| {
                info.active = info.name == current;
                info
            })
            .collect()
    }

    /// Check whether the active backend has what it needs to run
    pub async fn is_configured(&self) -> bool {
        self.backend.read().await.is_configured()
    }

    /// Model used by the active backend
    pub async fn model(&self) -> String {
        self.backend.read().await.model()
    }

    // ─── GENERATION ─────────────────────────────────────────────────

    /// Run one generation call on the active backend
    ///
    /// Resolves to `Cancelled` as soon as `cancel` fires and to `Timeout`
    /// when the backend does not answer within the configured deadline.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, GatewayError> {
        if cancel.is_cancelled() {
            return Err(GatewayError::Cancelled);
        }

        let backend = Arc::clone(&*self.backend.read().await);
        log::debug!(
            "Generating with {} ({} messages)",
            backend.name(),
            request.messages.len()
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                log::info!("Generation cancelled");
                Err(GatewayError::Cancelled)
            }
            result = tokio::time::timeout(self.timeout, backend.generate(request)) => match result {
                Ok(reply) => reply.map_err(GatewayError::Backend),
                Err(_) => {
                    log::warn!("Generation timed out after {:?}", self.timeout);
                    Err(GatewayError::Timeout(self.timeout))
                }
            },
        }
    }
}

#[cfg(feature = "backend-gemini")]
impl Default for GenerationGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared gateway type for application state
pub type SharedGateway = Arc<GenerationGateway>;
