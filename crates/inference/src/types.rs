//! Common types for generation operations

use conversation::RequestMessage;
use serde::{Deserialize, Serialize};

use crate::config::GenerationParams;

/// Everything a backend needs for one generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Serialized conversation, oldest first, ending with the new user turn
    pub messages: Vec<RequestMessage>,
    /// Fixed instruction prepended by the backend in its own format
    pub system_instruction: String,
    /// Sampling parameters
    #[serde(default)]
    pub params: GenerationParams,
}

impl GenerationRequest {
    pub fn new(messages: Vec<RequestMessage>, system_instruction: impl Into<String>) -> Self {
        Self {
            messages,
            system_instruction: system_instruction.into(),
            params: GenerationParams::default(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }
}
