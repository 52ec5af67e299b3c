//! meetscribe - Real-time meeting transcription server
//!
//! Streams 16kHz mono PCM over WebSocket, segments speech with a VAD
//! state machine, transcribes utterances through a single-flight dispatch
//! queue and persists each session as WAV plus JSON transcript.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod config;
pub mod defaults;
pub mod dispatch;
pub mod error;
pub mod segment;
pub mod server;
pub mod session;
pub mod storage;
pub mod stt;

// Core traits (detect → segment → transcribe → persist)
pub use audio::VoiceActivity;
pub use stt::Transcriber;

// Error handling
pub use error::{Result, ScribeError};

// Config
pub use config::Config;

// Session surface
pub use server::{Event, SessionHost};
pub use session::{SessionLog, TranscriptEntry};
