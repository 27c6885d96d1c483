use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

/// One chat message as carried over the realtime channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// A duplex-channel event: a name plus an opaque payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelEvent {
    pub event_name: String,
    pub payload: Value,
}

/// Outcome of applying one channel event to a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptUpdate {
    Appended,
    /// The message id was already present; the event was dropped.
    Duplicate,
    PartnerJoined(String),
    Ignored,
}

/// In-memory chat transcript with idempotent message insertion.
///
/// The realtime channel can redeliver events; a message whose id is already
/// present is dropped rather than duplicated. Single-writer within one
/// event-driven thread, so no further coordination is needed.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    seen: HashSet<Uuid>,
    participants: BTreeSet<String>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message unless its id has been seen before.
    ///
    /// Returns `false` when the message was dropped as a duplicate.
    pub fn push(&mut self, message: ChatMessage) -> bool {
        if !self.seen.insert(message.id) {
            debug!(id = %message.id, "dropping duplicate chat message");
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Apply one channel event.
    ///
    /// `new_message` payloads are inserted idempotently; `partner_joined`
    /// records the participant; anything else is ignored, as are payloads
    /// that do not decode.
    pub fn apply(&mut self, event: &ChannelEvent) -> TranscriptUpdate {
        match event.event_name.as_str() {
            "new_message" => {
                match serde_json::from_value::<ChatMessage>(event.payload.clone()) {
                    Ok(message) => {
                        if self.push(message) {
                            TranscriptUpdate::Appended
                        } else {
                            TranscriptUpdate::Duplicate
                        }
                    }
                    Err(_) => TranscriptUpdate::Ignored,
                }
            }
            "partner_joined" => match event.payload.get("name").and_then(Value::as_str) {
                Some(name) => {
                    self.participants.insert(name.to_owned());
                    TranscriptUpdate::PartnerJoined(name.to_owned())
                }
                None => TranscriptUpdate::Ignored,
            },
            _ => TranscriptUpdate::Ignored,
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn participants(&self) -> impl Iterator<Item = &str> {
        self.participants.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
