//! Gemini backend implementation
//!
//! Talks to Google's `generateContent` REST endpoint. Conversation roles map
//! directly (`user`/`model`), images travel as base64 `inlineData` parts and
//! the system instruction uses the dedicated `systemInstruction` field.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use conversation::{Part, RequestRole};
use serde::{Deserialize, Serialize};

use super::{error_for_status, http_client, BackendCapabilities, BackendError, GenerationBackend};
use crate::config::BackendConfig;
use crate::constants::{defaults, endpoints};
use crate::types::GenerationRequest;

/// Content block used in both requests and responses
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

/// Text or inline media part. Response parts may also be flagged as thoughts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    thought: bool,
}

/// Base64 inline payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Gemini backend using the hosted Generative Language API
pub struct GeminiBackend {
    /// HTTP client for API requests
    http_client: reqwest::Client,
    /// API base URL without trailing slash
    base_url: String,
    /// Model identifier
    model: String,
    /// API key (required)
    api_key: Option<String>,
}

impl GeminiBackend {
    /// Create a new Gemini backend from configuration
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            http_client: http_client(),
            base_url: config.base_url_or(endpoints::GEMINI),
            model: config.model_or(defaults::GEMINI_MODEL),
            api_key: config.api_key().map(str::to_string),
        }
    }

    /// Get static capabilities (for registry info before instantiation)
    pub fn static_capabilities() -> BackendCapabilities {
        BackendCapabilities {
            vision: true,
            thinking_budget: true,
            system_instruction: true,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// Build the `generateContent` body for a request
    fn build_body(request: &GenerationRequest) -> GenerateContentRequest {
        let contents = request
            .messages
            .iter()
            .map(|message| GeminiContent {
                role: Some(
                    match message.role {
                        RequestRole::User => "user",
                        RequestRole::Model => "model",
                    }
                    .to_string(),
                ),
                parts: message.parts.iter().map(Self::convert_part).collect(),
            })
            .collect();

        let system_instruction = if request.system_instruction.trim().is_empty() {
            None
        } else {
            Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: Some(request.system_instruction.clone()),
                    ..Default::default()
                }],
            })
        };

        GenerateContentRequest {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature: request.params.temperature,
                max_output_tokens: request.params.max_output_tokens,
                thinking_config: request
                    .params
                    .thinking_budget
                    .map(|thinking_budget| ThinkingConfig { thinking_budget }),
            },
        }
    }

    fn convert_part(part: &Part) -> GeminiPart {
        match part {
            Part::Text { text } => GeminiPart {
                text: Some(text.clone()),
                ..Default::default()
            },
            Part::InlineData { media_type, data } => GeminiPart {
                inline_data: Some(InlineData {
                    mime_type: media_type.clone(),
                    data: STANDARD.encode(data),
                }),
                ..Default::default()
            },
        }
    }

    /// Concatenate the answer text of the first candidate, skipping thoughts
    fn extract_text(response: GenerateContentResponse) -> Result<String, BackendError> {
        let Some(candidate) = response.candidates.into_iter().next() else {
            if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
                return Err(BackendError::InvalidResponse(format!(
                    "Prompt blocked: {}",
                    reason
                )));
            }
            return Err(BackendError::EmptyResponse);
        };

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|part| !part.thought)
            .filter_map(|part| part.text)
            .collect();

        if text.is_empty() {
            log::warn!(
                "Gemini returned no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            );
            return Err(BackendError::EmptyResponse);
        }

        Ok(text)
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn description(&self) -> &'static str {
        "Google Gemini via the generateContent API. Supports images and a reasoning budget."
    }

    fn capabilities(&self) -> BackendCapabilities {
        Self::static_capabilities()
    }

    fn model(&self) -> String {
        self.model.clone()
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| BackendError::NotConfigured("Gemini API key not set".to_string()))?;

        let body = Self::build_body(request);

        log::debug!(
            "Gemini: sending {} messages to {}",
            body.contents.len(),
            self.model
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let response = error_for_status(response).await?;

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        Self::extract_text(parsed)
    }
}
