//! Error types for the conversation core

use thiserror::Error;

/// Result type alias using ConversationError
pub type Result<T> = std::result::Result<T, ConversationError>;

/// Errors raised while building requests or exporting artifacts
#[derive(Debug, Error)]
pub enum ConversationError {
    /// Outgoing turn has neither text nor an image
    #[error("Turn has no text and no image attached")]
    EmptyTurn,

    /// Image string is not a `data:<type>;base64,<payload>` URL
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// Data URL payload is not valid base64
    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// Archive could not be written
    #[error("Export failed: {0}")]
    Export(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConversationError {
    /// Create an invalid data URL error with a message
    pub fn data_url(msg: impl Into<String>) -> Self {
        Self::InvalidDataUrl(msg.into())
    }
}

impl From<zip::result::ZipError> for ConversationError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Export(err.to_string())
    }
}
