//! Turn submission for one website-building conversation
//!
//! `BuilderSession` owns the transcript and the current artifact. A submit
//! serializes the full history plus the new turn, runs one generation call
//! through the gateway, decodes the reply and only then appends both turns.

use std::io::{Seek, Write};
use std::sync::Arc;
use std::time::Duration;

use conversation::{
    archive_file_name, decode_reply, export_zip, render_document, serialize_conversation,
    ConversationError, GeneratedCode, ImageAttachment, OutgoingTurn, Transcript,
};
use inference::{GatewayError, GenerationParams, GenerationRequest, SharedGateway};
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::constants::defaults;
use crate::events::{EventSink, NullEventSink, SessionEvent};
use crate::progress::ProgressTicker;
use crate::prompts::{APOLOGY_TEXT, DATABASE_INTEGRATION_PROMPT, SYSTEM_INSTRUCTION};

/// Result of a submitted turn that passed validation
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Reply recorded. `code_updated` is true when it carried a new artifact.
    Completed {
        display_text: String,
        code_updated: bool,
    },
    /// Generation failed; the user turn and an apology were recorded
    Failed { error: String },
    /// Cancelled before the reply arrived; nothing was recorded
    Cancelled,
}

/// Errors returned by session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Turn rejected: {0}")]
    Rejected(#[from] ConversationError),

    #[error("No generated code to export")]
    NoArtifact,
}

/// One conversation with the website builder
pub struct BuilderSession {
    transcript: Transcript,
    current_code: Option<GeneratedCode>,
    gateway: SharedGateway,
    params: GenerationParams,
    system_instruction: String,
    project_name: Option<String>,
    sink: Arc<dyn EventSink>,
    progress_interval: Duration,
}

impl BuilderSession {
    pub fn new(gateway: SharedGateway) -> Self {
        Self {
            transcript: Transcript::new(),
            current_code: None,
            gateway,
            params: GenerationParams::default(),
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            project_name: None,
            sink: Arc::new(NullEventSink),
            progress_interval: Duration::from_millis(defaults::PROGRESS_INTERVAL_MS),
        }
    }

    /// Create a session using the generation settings from `config`
    pub fn from_config(config: &AppConfig, gateway: SharedGateway) -> Self {
        let mut session = Self::new(gateway);
        session.params = config.generation.clone();
        session.project_name = config.project_name.clone();
        session.progress_interval = config.progress_interval();
        session
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Most recent artifact produced in this session
    pub fn current_code(&self) -> Option<&GeneratedCode> {
        self.current_code.as_ref()
    }

    pub fn gateway(&self) -> &SharedGateway {
        &self.gateway
    }

    pub fn project_name(&self) -> Option<&str> {
        self.project_name.as_deref()
    }

    pub fn set_project_name(&mut self, name: Option<String>) {
        self.project_name = name;
    }

    /// Submit a turn and wait for the reply
    pub async fn submit(
        &mut self,
        text: impl Into<String>,
        image: Option<ImageAttachment>,
    ) -> Result<SubmitOutcome, SessionError> {
        self.submit_with_cancel(text, image, &CancellationToken::new())
            .await
    }

    /// Submit a turn that can be abandoned through `cancel`
    ///
    /// Returns `Err` only when the turn itself is invalid; in that case no
    /// request is made and the transcript is untouched.
    pub async fn submit_with_cancel(
        &mut self,
        text: impl Into<String>,
        image: Option<ImageAttachment>,
        cancel: &CancellationToken,
    ) -> Result<SubmitOutcome, SessionError> {
        let outgoing = OutgoingTurn::new(text, image)?;
        let messages = serialize_conversation(self.transcript.turns(), &outgoing)?;
        let request = GenerationRequest::new(messages, self.system_instruction.clone())
            .with_params(self.params.clone());

        self.emit(SessionEvent::GenerationStarted);
        let ticker = ProgressTicker::start(self.sink.clone(), self.progress_interval);
        let result = self.gateway.generate(&request, cancel).await;
        ticker.stop().await;

        let (text, image) = outgoing.into_parts();
        match result {
            Ok(raw) => {
                let (display_text, code) = decode_reply(&raw).into_parts();
                let code_updated = code.is_some();

                self.transcript.push_user(text, image);
                self.transcript.push_model(display_text.clone(), code.clone());
                if code.is_some() {
                    self.current_code = code;
                }

                log::info!(
                    "Turn completed ({} turns, code updated: {})",
                    self.transcript.len(),
                    code_updated
                );
                self.emit(SessionEvent::GenerationCompleted { code_updated });
                Ok(SubmitOutcome::Completed {
                    display_text,
                    code_updated,
                })
            }
            Err(GatewayError::Cancelled) => {
                log::info!("Turn cancelled, transcript unchanged");
                self.emit(SessionEvent::GenerationCancelled);
                Ok(SubmitOutcome::Cancelled)
            }
            Err(e) => {
                log::error!("Generation failed: {}", e);
                let error = e.to_string();

                self.transcript.push_user(text, image);
                self.transcript.push_model(APOLOGY_TEXT, None);

                self.emit(SessionEvent::GenerationFailed {
                    error: error.clone(),
                });
                Ok(SubmitOutcome::Failed { error })
            }
        }
    }

    /// Ask the model to wire a Supabase backend into the current project
    pub async fn request_database_integration(&mut self) -> Result<SubmitOutcome, SessionError> {
        self.request_database_integration_with_cancel(&CancellationToken::new())
            .await
    }

    /// Cancellable form of [`request_database_integration`](Self::request_database_integration)
    pub async fn request_database_integration_with_cancel(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<SubmitOutcome, SessionError> {
        self.submit_with_cancel(DATABASE_INTEGRATION_PROMPT, None, cancel)
            .await
    }

    /// Start over with an empty transcript and no artifact
    pub fn clear(&mut self) {
        self.transcript = Transcript::new();
        self.current_code = None;
        log::debug!("Session cleared");
    }

    /// Standalone HTML document for the current artifact
    pub fn export_document(&self) -> Option<String> {
        self.current_code
            .as_ref()
            .map(|code| render_document(code, self.project_name.as_deref()))
    }

    /// Write the current artifact as a zip archive
    pub fn export_zip<W: Write + Seek>(&self, writer: W) -> Result<W, SessionError> {
        let code = self.current_code.as_ref().ok_or(SessionError::NoArtifact)?;
        Ok(export_zip(code, self.project_name.as_deref(), writer)?)
    }

    /// Suggested file name for [`export_zip`](Self::export_zip)
    pub fn archive_file_name(&self) -> String {
        archive_file_name(self.project_name.as_deref())
    }

    fn emit(&self, event: SessionEvent) {
        if let Err(e) = self.sink.send(event) {
            log::debug!("Dropped session event: {}", e);
        }
    }
}
