//! Wire protocol: JSON control messages and server events.
//!
//! Every text message is a JSON object with a `type` discriminator.
//! Binary messages carry raw PCM frames and never reach this module.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScribeError};

/// Client-to-server control messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ControlMessage {
    /// Begin a session: clears all per-session state.
    #[serde(rename = "session.start")]
    SessionStart,
    /// End a session: flush, drain, persist.
    #[serde(rename = "session.stop")]
    SessionStop,
}

impl ControlMessage {
    /// Parses a control message, distinguishing malformed JSON from a
    /// well-formed message of an unknown type.
    pub fn parse(text: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|_| ScribeError::InvalidControlMessage)?;

        match serde_json::from_value::<ControlMessage>(value.clone()) {
            Ok(message) => Ok(message),
            Err(_) => {
                let kind = value
                    .get("type")
                    .and_then(|t| t.as_str())
                    .unwrap_or("unknown")
                    .to_string();
                Err(ScribeError::UnsupportedControlMessage { kind })
            }
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Server-to-client events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Event {
    /// Session accepted; audio frames may now be sent.
    #[serde(rename = "session.ready")]
    SessionReady,

    /// Interim transcription of an ongoing utterance.
    #[serde(rename = "transcript.partial")]
    TranscriptPartial { text: String, segment_id: u64 },

    /// Finalized transcription of a completed utterance.
    #[serde(rename = "transcript.final")]
    TranscriptFinal {
        text: String,
        speaker: String,
        timestamp: String,
        segment_id: u64,
    },

    /// The meeting title changed.
    #[serde(rename = "title.update")]
    TitleUpdate { title: String },

    /// Session persisted to disk.
    #[serde(rename = "session.saved")]
    SessionSaved {
        session_dir: String,
        audio_path: String,
        transcript_path: String,
    },

    /// Recoverable error; the connection stays open.
    #[serde(rename = "error")]
    Error { message: String },
}

impl Event {
    /// Serializes the event to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Convenience constructor for error events.
    pub fn error(message: impl std::fmt::Display) -> Self {
        Event::Error {
            message: message.to_string(),
        }
    }
}
