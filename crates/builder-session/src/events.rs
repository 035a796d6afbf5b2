//! Event types for reporting generation progress
//!
//! Events are sent from the session to the front-end (or any consumer)
//! to report progress, completion, failures and cancellation.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Trait for sending session events
///
/// This abstracts over the transport mechanism (mpsc channel, test
/// collector, nothing at all).
pub trait EventSink: Send + Sync {
    /// Send an event
    ///
    /// Returns an error if the event could not be sent (e.g., channel closed)
    fn send(&self, event: SessionEvent) -> Result<(), EventError>;
}

/// Error when sending events fails
#[derive(Debug, Clone, thiserror::Error)]
#[error("Event error: {message}")]
pub struct EventError {
    pub message: String,
}

impl EventError {
    pub fn channel_closed() -> Self {
        Self {
            message: "Channel closed".to_string(),
        }
    }
}

/// Events emitted while a turn is being submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    /// The request left for the backend
    GenerationStarted,

    /// Rotating status line while waiting for the reply
    Progress { message: String },

    /// The reply was decoded and recorded
    #[serde(rename_all = "camelCase")]
    GenerationCompleted { code_updated: bool },

    /// The call failed; an apology turn was recorded
    GenerationFailed { error: String },

    /// The call was cancelled; nothing was recorded
    GenerationCancelled,
}

impl SessionEvent {
    pub fn progress(message: &str) -> Self {
        Self::Progress {
            message: message.to_string(),
        }
    }
}

/// A no-op event sink that discards all events
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: SessionEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// Forwards events into an unbounded tokio channel
pub struct ChannelEventSink {
    sender: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelEventSink {
    pub fn new(sender: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { sender }
    }

    /// Create a sink together with the receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl EventSink for ChannelEventSink {
    fn send(&self, event: SessionEvent) -> Result<(), EventError> {
        self.sender
            .send(event)
            .map_err(|_| EventError::channel_closed())
    }
}

/// A vector-based event sink that collects events
///
/// Useful for testing to verify events were emitted correctly.
pub struct VecEventSink {
    events: Mutex<Vec<SessionEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Get all collected events
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Clear all collected events
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Default for VecEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: SessionEvent) -> Result<(), EventError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_event_sink() {
        let sink = VecEventSink::new();
        sink.send(SessionEvent::progress("Writing code...")).unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            SessionEvent::Progress { message } => assert_eq!(message, "Writing code..."),
            _ => panic!("Expected Progress event"),
        }

        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_null_event_sink() {
        let sink = NullEventSink;
        sink.send(SessionEvent::GenerationStarted).unwrap();
    }

    #[tokio::test]
    async fn test_channel_event_sink() {
        let (sink, mut receiver) = ChannelEventSink::channel();
        sink.send(SessionEvent::GenerationCancelled).unwrap();
        assert_eq!(receiver.recv().await, Some(SessionEvent::GenerationCancelled));

        drop(receiver);
        assert!(sink.send(SessionEvent::GenerationStarted).is_err());
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(SessionEvent::GenerationCompleted { code_updated: true })
            .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "generationCompleted", "codeUpdated": true })
        );
    }
}
