//! Website-builder session
//!
//! Glue between the conversation core and the generation gateway:
//!
//! - **Session**: validates a turn, builds the request, runs one generation
//!   call and records the user and model turns together
//! - **Progress**: rotating status messages while a call is pending
//! - **Events**: progress and outcome notifications for any front-end
//! - **Config**: persisted backend selection and generation settings
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use builder_session::{AppConfig, BuilderSession};
//! use inference::GenerationGateway;
//!
//! let config = AppConfig::load(&dir).await?;
//! let gateway = GenerationGateway::from_config(
//!     &config.active_backend,
//!     &config.backend_config(&config.active_backend),
//! )?;
//! let mut session = BuilderSession::from_config(&config, Arc::new(gateway));
//! let outcome = session.submit("a landing page for a bakery", None).await?;
//! ```

pub mod config;
pub mod constants;
pub mod events;
pub mod progress;
pub mod prompts;
pub mod session;

// Re-exports for convenience
pub use config::{AppConfig, ConfigError};
pub use events::{ChannelEventSink, EventError, EventSink, NullEventSink, SessionEvent, VecEventSink};
pub use progress::ProgressTicker;
pub use prompts::{APOLOGY_TEXT, DATABASE_INTEGRATION_PROMPT, PROGRESS_MESSAGES, SYSTEM_INSTRUCTION};
pub use session::{BuilderSession, SessionError, SubmitOutcome};
