//! Append-only conversation log
//!
//! The transcript is the single owner of a conversation's turns. Turns are
//! appended in chronological order, receive a monotonically increasing id,
//! and are only ever handed out by shared reference afterwards.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::types::{GeneratedCode, ImageAttachment, Role, Turn, TurnId};

/// Ordered, append-only list of turns
///
/// Only the turns are persisted. The id counter is rebuilt on load so a
/// restored transcript never hands out an id it already holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "SavedTranscript")]
pub struct Transcript {
    turns: Vec<Turn>,
    #[serde(skip)]
    next_id: u64,
}

#[derive(Deserialize)]
struct SavedTranscript {
    #[serde(default)]
    turns: Vec<Turn>,
}

impl From<SavedTranscript> for Transcript {
    fn from(saved: SavedTranscript) -> Self {
        let next_id = saved
            .turns
            .iter()
            .map(|turn| turn.id.0 + 1)
            .max()
            .unwrap_or(0);
        Self {
            turns: saved.turns,
            next_id,
        }
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn
    pub fn push_user(&mut self, text: impl Into<String>, image: Option<ImageAttachment>) -> &Turn {
        self.append(Role::User, text.into(), image, None)
    }

    /// Append a model turn, optionally carrying the artifact it produced
    pub fn push_model(&mut self, text: impl Into<String>, code: Option<GeneratedCode>) -> &Turn {
        self.append(Role::Model, text.into(), None, code)
    }

    /// Append a local notice. System turns are never serialized.
    pub fn push_system(&mut self, text: impl Into<String>) -> &Turn {
        self.append(Role::System, text.into(), None, None)
    }

    fn append(
        &mut self,
        role: Role,
        text: String,
        image: Option<ImageAttachment>,
        code: Option<GeneratedCode>,
    ) -> &Turn {
        let id = TurnId(self.next_id);
        self.next_id += 1;

        // Clamp so a backwards clock step never reorders display timestamps
        let now = Utc::now();
        let timestamp = match self.turns.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };

        log::debug!("Transcript: appending {:?} {} ({} chars)", role, id, text.len());

        self.turns.push(Turn {
            id,
            role,
            text,
            image,
            code,
            timestamp,
        });
        &self.turns[self.turns.len() - 1]
    }

    /// All turns in append order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn get(&self, id: TurnId) -> Option<&Turn> {
        self.turns.iter().find(|turn| turn.id == id)
    }

    /// Artifact of the most recent model turn that produced one
    pub fn latest_code(&self) -> Option<&GeneratedCode> {
        self.turns
            .iter()
            .rev()
            .filter(|turn| turn.role == Role::Model)
            .find_map(|turn| turn.code.as_ref())
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_order_and_ids() {
        let mut transcript = Transcript::new();
        transcript.push_user("first", None);
        transcript.push_model("second", None);
        transcript.push_system("third");

        let ids: Vec<u64> = transcript.iter().map(|t| t.id().0).collect();
        assert_eq!(ids, vec![0, 1, 2]);

        let roles: Vec<Role> = transcript.iter().map(|t| t.role()).collect();
        assert_eq!(roles, vec![Role::User, Role::Model, Role::System]);
        assert_eq!(transcript.last().unwrap().text(), "third");
    }

    #[test]
    fn test_timestamps_never_decrease() {
        let mut transcript = Transcript::new();
        for i in 0..20 {
            transcript.push_user(format!("turn {}", i), None);
        }
        let turns = transcript.turns();
        assert!(turns.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()));
    }

    #[test]
    fn test_latest_code_is_most_recent_artifact() {
        let mut transcript = Transcript::new();
        assert!(transcript.latest_code().is_none());

        transcript.push_user("make a button", None);
        transcript.push_model("ok", Some(GeneratedCode::new("<button>A</button>", "", "")));
        transcript.push_user("make it red", None);
        transcript.push_model("done", Some(GeneratedCode::new("<button>B</button>", "", "")));
        transcript.push_user("thanks", None);
        transcript.push_model("you're welcome", None);

        assert_eq!(transcript.latest_code().unwrap().html, "<button>B</button>");
    }

    #[test]
    fn test_restored_transcript_continues_ids() {
        let mut transcript = Transcript::new();
        transcript.push_user("hello", None);
        transcript.push_model("hi", None);

        let mut json = serde_json::to_value(&transcript).unwrap();
        assert!(json.get("next_id").is_none());
        json["next_id"] = serde_json::json!(0);

        let mut restored: Transcript = serde_json::from_value(json).unwrap();
        let id = restored.push_user("again", None).id();
        assert_eq!(id, TurnId(2));

        let ids: Vec<TurnId> = restored.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![TurnId(0), TurnId(1), TurnId(2)]);
    }

    #[test]
    fn test_get_by_id() {
        let mut transcript = Transcript::new();
        let id = transcript.push_user("hello", None).id();
        assert_eq!(transcript.get(id).unwrap().text(), "hello");
        assert!(transcript.get(TurnId(99)).is_none());
    }
}
