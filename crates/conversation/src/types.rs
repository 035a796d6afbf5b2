//! Core data model: turns, image attachments and generated code artifacts

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConversationError, Result};

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
    /// Local notices; never sent to the model
    System,
}

/// Position of a turn in its transcript, assigned on append
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TurnId(pub u64);

impl std::fmt::Display for TurnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "turn-{}", self.0)
    }
}

/// Inline image carried by a turn.
///
/// Held decoded in memory. Travels as a `data:<mediaType>;base64,<payload>`
/// URL whenever it is serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageAttachment {
    /// MIME type, e.g. `image/png`
    pub media_type: String,
    /// Raw image bytes
    pub data: Vec<u8>,
}

impl ImageAttachment {
    pub fn new(media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            data,
        }
    }

    /// Parse a data URL.
    ///
    /// The header is everything before the first comma; the media type is
    /// the header text between `:` and `;`.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let (header, payload) = url
            .split_once(',')
            .ok_or_else(|| ConversationError::data_url("missing ',' separator"))?;

        let after_colon = header
            .split_once(':')
            .map(|(_, rest)| rest)
            .ok_or_else(|| ConversationError::data_url("missing ':' in header"))?;
        let media_type = after_colon
            .split_once(';')
            .map(|(media, _)| media)
            .ok_or_else(|| ConversationError::data_url("missing ';' in header"))?;

        if media_type.is_empty() {
            return Err(ConversationError::data_url("empty media type"));
        }

        let data = STANDARD.decode(payload.trim())?;
        Ok(Self::new(media_type, data))
    }

    /// Base64 encoding of the raw bytes
    pub fn base64_data(&self) -> String {
        STANDARD.encode(&self.data)
    }

    /// Render back to `data:<mediaType>;base64,<payload>`
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.base64_data())
    }
}

impl TryFrom<String> for ImageAttachment {
    type Error = ConversationError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_data_url(&value)
    }
}

impl From<ImageAttachment> for String {
    fn from(image: ImageAttachment) -> Self {
        image.to_data_url()
    }
}

/// Structured build artifact extracted from one model reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCode {
    /// Markup injected into the page body
    #[serde(default)]
    pub html: String,
    /// Custom stylesheet
    #[serde(default)]
    pub css: String,
    /// Page script
    #[serde(default)]
    pub javascript: String,
}

impl GeneratedCode {
    pub fn new(
        html: impl Into<String>,
        css: impl Into<String>,
        javascript: impl Into<String>,
    ) -> Self {
        Self {
            html: html.into(),
            css: css.into(),
            javascript: javascript.into(),
        }
    }

    /// True when all three fields are empty
    pub fn is_blank(&self) -> bool {
        self.html.is_empty() && self.css.is_empty() && self.javascript.is_empty()
    }
}

/// One message in the conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub(crate) id: TurnId,
    pub(crate) role: Role,
    pub(crate) text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) image: Option<ImageAttachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) code: Option<GeneratedCode>,
    pub(crate) timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn id(&self) -> TurnId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image(&self) -> Option<&ImageAttachment> {
        self.image.as_ref()
    }

    pub fn code(&self) -> Option<&GeneratedCode> {
        self.code.as_ref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
