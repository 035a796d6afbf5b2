//! OpenAI-compatible backend implementation
//!
//! This backend talks to any server exposing `/v1/chat/completions`
//! (OpenAI, OpenRouter, LM Studio, Ollama). Model turns become `assistant`
//! messages and images are sent as `image_url` data URLs ahead of the text.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use conversation::{Part, RequestRole};
use serde_json::{json, Value};

use super::{error_for_status, http_client, BackendCapabilities, BackendError, GenerationBackend};
use crate::config::BackendConfig;
use crate::constants::{defaults, endpoints};
use crate::types::GenerationRequest;

/// Backend for OpenAI-compatible chat completion servers
pub struct OpenAiCompatBackend {
    /// HTTP client for API requests
    http_client: reqwest::Client,
    /// Base URL of the server
    base_url: String,
    /// Model identifier
    model: String,
    /// Bearer token (optional for local servers)
    api_key: Option<String>,
    /// Whether a custom base URL was given
    custom_server: bool,
}

impl OpenAiCompatBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            http_client: http_client(),
            base_url: config.base_url_or(endpoints::OPENAI),
            model: config.model_or(defaults::OPENAI_COMPAT_MODEL),
            api_key: config.api_key().map(str::to_string),
            custom_server: config
                .base_url
                .as_deref()
                .is_some_and(|url| !url.trim().is_empty()),
        }
    }

    /// Get static capabilities (for registry info before instantiation)
    pub fn static_capabilities() -> BackendCapabilities {
        BackendCapabilities {
            vision: true, // Depends on the served model
            thinking_budget: false,
            system_instruction: false, // Sent as a leading system message
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    /// Build the chat completion request body
    fn build_body(&self, request: &GenerationRequest) -> Value {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if !request.system_instruction.trim().is_empty() {
            messages.push(json!({
                "role": "system",
                "content": request.system_instruction
            }));
        }

        for message in &request.messages {
            let role = match message.role {
                RequestRole::User => "user",
                RequestRole::Model => "assistant",
            };
            let content: Vec<Value> = message.parts.iter().map(Self::convert_part).collect();
            messages.push(json!({
                "role": role,
                "content": content
            }));
        }

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": request.params.temperature,
        });

        if let Some(max_tokens) = request.params.max_output_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        body
    }

    fn convert_part(part: &Part) -> Value {
        match part {
            Part::Text { text } => json!({
                "type": "text",
                "text": text
            }),
            Part::InlineData { media_type, data } => json!({
                "type": "image_url",
                "image_url": {
                    "url": format!("data:{};base64,{}", media_type, STANDARD.encode(data))
                }
            }),
        }
    }

    fn extract_text(json: &Value) -> Result<String, BackendError> {
        let choice = json
            .get("choices")
            .and_then(|c| c.get(0))
            .ok_or_else(|| BackendError::InvalidResponse("Response has no choices".to_string()))?;

        match choice
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
        {
            Some(content) if !content.is_empty() => Ok(content.to_string()),
            _ => Err(BackendError::EmptyResponse),
        }
    }
}

#[async_trait]
impl GenerationBackend for OpenAiCompatBackend {
    fn name(&self) -> &'static str {
        "openai-compat"
    }

    fn description(&self) -> &'static str {
        "Any OpenAI-compatible chat completions server (OpenAI, OpenRouter, LM Studio, Ollama)."
    }

    fn capabilities(&self) -> BackendCapabilities {
        Self::static_capabilities()
    }

    fn model(&self) -> String {
        self.model.clone()
    }

    fn is_configured(&self) -> bool {
        // Local servers usually accept unauthenticated requests
        self.api_key.is_some() || self.custom_server
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        if !self.is_configured() {
            return Err(BackendError::NotConfigured(
                "API key required for the public OpenAI endpoint".to_string(),
            ));
        }

        let body = self.build_body(request);

        let mut builder = self.http_client.post(self.endpoint()).json(&body);
        if let Some(ref api_key) = self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        log::debug!(
            "OpenAI-compatible: sending {} messages to {} at {}",
            request.messages.len(),
            self.model,
            self.base_url
        );

        let response = error_for_status(builder.send().await?).await?;

        let json: Value = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        Self::extract_text(&json)
    }
}
