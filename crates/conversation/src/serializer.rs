//! Conversation Serializer
//!
//! Maps the ordered turn history plus a new outgoing turn to the role-tagged,
//! multi-part messages a multimodal generation backend expects.
//!
//! # Ordering contract
//! Within each message an image attachment always precedes the text part.
//! This holds for every message in the history, not only the newest one.

use serde::{Deserialize, Serialize};

use crate::error::{ConversationError, Result};
use crate::types::{ImageAttachment, Role, Turn};

/// Role of a request message. System turns never reach the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestRole {
    User,
    Model,
}

/// One part of a request message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    Text { text: String },
    InlineData { media_type: String, data: Vec<u8> },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn is_inline_data(&self) -> bool {
        matches!(self, Part::InlineData { .. })
    }
}

impl From<&ImageAttachment> for Part {
    fn from(image: &ImageAttachment) -> Self {
        Part::InlineData {
            media_type: image.media_type.clone(),
            data: image.data.clone(),
        }
    }
}

/// Role-tagged message ready for a generation backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMessage {
    pub role: RequestRole,
    pub parts: Vec<Part>,
}

impl RequestMessage {
    /// Build a message, placing the attachment before the text
    fn build(role: RequestRole, text: &str, image: Option<&ImageAttachment>) -> Self {
        let mut parts = Vec::with_capacity(2);
        if let Some(image) = image {
            parts.push(Part::from(image));
        }
        parts.push(Part::text(text));
        Self { role, parts }
    }

    /// Concatenated text of all text parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect()
    }
}

/// A validated turn waiting to be sent.
///
/// Construction fails when the text is blank and no image is attached, so a
/// message with nothing useful in it can never be built.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingTurn {
    text: String,
    image: Option<ImageAttachment>,
}

impl OutgoingTurn {
    pub fn new(text: impl Into<String>, image: Option<ImageAttachment>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() && image.is_none() {
            return Err(ConversationError::EmptyTurn);
        }
        Ok(Self { text, image })
    }

    /// Build from prompt text and an optional `data:` URL
    pub fn from_data_url(text: impl Into<String>, image: Option<&str>) -> Result<Self> {
        let image = image.map(ImageAttachment::from_data_url).transpose()?;
        Self::new(text, image)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image(&self) -> Option<&ImageAttachment> {
        self.image.as_ref()
    }

    /// Split into owned parts for appending to a transcript
    pub fn into_parts(self) -> (String, Option<ImageAttachment>) {
        (self.text, self.image)
    }
}

/// Serialize history plus the outgoing turn into request messages.
///
/// Produces one message per non-system history turn followed by exactly one
/// user message for `outgoing`.
pub fn serialize_conversation(
    history: &[Turn],
    outgoing: &OutgoingTurn,
) -> Result<Vec<RequestMessage>> {
    if outgoing.text.trim().is_empty() && outgoing.image.is_none() {
        return Err(ConversationError::EmptyTurn);
    }

    let mut messages = Vec::with_capacity(history.len() + 1);

    for turn in history {
        let role = match turn.role() {
            Role::User => RequestRole::User,
            Role::Model => RequestRole::Model,
            Role::System => continue,
        };
        messages.push(RequestMessage::build(role, turn.text(), turn.image()));
    }

    messages.push(RequestMessage::build(
        RequestRole::User,
        &outgoing.text,
        outgoing.image.as_ref(),
    ));

    log::debug!(
        "Serialized {} history turns into {} request messages",
        history.len(),
        messages.len()
    );

    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Transcript;
    use crate::types::GeneratedCode;

    fn png() -> ImageAttachment {
        ImageAttachment::new("image/png", vec![1, 2, 3])
    }

    #[test]
    fn test_empty_turn_rejected() {
        assert!(matches!(
            OutgoingTurn::new("", None),
            Err(ConversationError::EmptyTurn)
        ));
        assert!(matches!(
            OutgoingTurn::new("   \n\t", None),
            Err(ConversationError::EmptyTurn)
        ));
        assert!(OutgoingTurn::new("", Some(png())).is_ok());
        assert!(OutgoingTurn::new("hello", None).is_ok());
    }

    #[test]
    fn test_empty_history() {
        let outgoing = OutgoingTurn::new("build a button", None).unwrap();
        let messages = serialize_conversation(&[], &outgoing).unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, RequestRole::User);
        assert_eq!(messages[0].parts, vec![Part::text("build a button")]);
    }

    #[test]
    fn test_message_count_excludes_system_turns() {
        let mut transcript = Transcript::new();
        transcript.push_system("welcome");
        transcript.push_user("one", None);
        transcript.push_model("two", Some(GeneratedCode::new("<p/>", "", "")));
        transcript.push_system("notice");
        transcript.push_user("three", Some(png()));
        transcript.push_model("four", None);

        let outgoing = OutgoingTurn::new("five", None).unwrap();
        let messages = serialize_conversation(transcript.turns(), &outgoing).unwrap();

        assert_eq!(messages.len(), 4 + 1);
        let texts: Vec<String> = messages.iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["one", "two", "three", "four", "five"]);

        let roles: Vec<RequestRole> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                RequestRole::User,
                RequestRole::Model,
                RequestRole::User,
                RequestRole::Model,
                RequestRole::User,
            ]
        );
    }

    #[test]
    fn test_attachment_precedes_text_at_every_position() {
        let mut transcript = Transcript::new();
        transcript.push_user("first with image", Some(png()));
        transcript.push_model("reply", None);
        transcript.push_user("second with image", Some(png()));
        transcript.push_model("reply", None);

        let outgoing = OutgoingTurn::new("third with image", Some(png())).unwrap();
        let messages = serialize_conversation(transcript.turns(), &outgoing).unwrap();

        for index in [0, 2, 4] {
            let parts = &messages[index].parts;
            assert_eq!(parts.len(), 2);
            assert!(parts[0].is_inline_data());
            assert!(matches!(parts[1], Part::Text { .. }));
        }
        for index in [1, 3] {
            assert_eq!(messages[index].parts.len(), 1);
        }
    }

    #[test]
    fn test_image_only_turn_keeps_empty_text_part() {
        let outgoing = OutgoingTurn::new("", Some(png())).unwrap();
        let messages = serialize_conversation(&[], &outgoing).unwrap();

        assert_eq!(
            messages[0].parts,
            vec![
                Part::InlineData {
                    media_type: "image/png".to_string(),
                    data: vec![1, 2, 3],
                },
                Part::text(""),
            ]
        );
    }

    #[test]
    fn test_outgoing_from_data_url() {
        let outgoing =
            OutgoingTurn::from_data_url("copy this", Some("data:image/webp;base64,AQID")).unwrap();
        assert_eq!(outgoing.image().unwrap().media_type, "image/webp");
        assert_eq!(outgoing.image().unwrap().data, vec![1, 2, 3]);

        assert!(matches!(
            OutgoingTurn::from_data_url("x", Some("garbage")),
            Err(ConversationError::InvalidDataUrl(_))
        ));
    }

    #[test]
    fn test_serialization_is_pure() {
        let mut transcript = Transcript::new();
        transcript.push_user("a", None);
        let before = transcript.clone();

        let outgoing = OutgoingTurn::new("b", None).unwrap();
        let first = serialize_conversation(transcript.turns(), &outgoing).unwrap();
        let second = serialize_conversation(transcript.turns(), &outgoing).unwrap();

        assert_eq!(first, second);
        assert_eq!(transcript.turns(), before.turns());
    }
}
