//! Conversation core for SiteCraft
//!
//! This crate holds the parts of the website builder that have real
//! invariants, independent of any UI or model provider:
//!
//! - **Transcript**: an append-only log of immutable turns
//! - **Serializer**: maps history plus an outgoing turn to multimodal request messages
//! - **Decoder**: splits a raw model reply into display text and a code artifact
//! - **Export**: renders an artifact as a standalone HTML document or zip archive
//!
//! Serializer and decoder are pure functions. They borrow the transcript and
//! never own or mutate it.
//!
//! # Example
//!
//! ```rust,ignore
//! use conversation::{decode_reply, serialize_conversation, OutgoingTurn, Transcript};
//!
//! let transcript = Transcript::new();
//! let outgoing = OutgoingTurn::new("build a pricing page", None)?;
//! let messages = serialize_conversation(transcript.turns(), &outgoing)?;
//!
//! // ... hand `messages` to a generation backend, get `raw` back ...
//! let decoded = decode_reply(&raw);
//! ```

pub mod decoder;
pub mod error;
pub mod export;
pub mod serializer;
pub mod transcript;
pub mod types;

// Re-exports for convenience
pub use decoder::{decode_reply, CodeBlock, DecodedReply};
pub use error::{ConversationError, Result};
pub use export::{archive_file_name, export_zip, render_document};
pub use serializer::{serialize_conversation, OutgoingTurn, Part, RequestMessage, RequestRole};
pub use transcript::Transcript;
pub use types::{GeneratedCode, ImageAttachment, Role, Turn, TurnId};
