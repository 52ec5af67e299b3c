//! Speech-to-text: engine trait, hallucination filter and backends.

pub mod filter;
pub mod transcriber;
pub mod whisper;

pub use filter::{clean_transcript, normalize_text, title_from_text};
pub use transcriber::{MockTranscriber, Transcriber, Transcription, Warmup};
pub use whisper::{WhisperConfig, WhisperTranscriber};
