//! Error types for meetscribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScribeError {
    // Protocol errors
    #[error("Invalid frame size: expected {expected} bytes, got {actual}")]
    InvalidFrameSize { expected: usize, actual: usize },

    #[error("Audio received before session.start")]
    NoActiveSession,

    #[error("Invalid JSON control message")]
    InvalidControlMessage,

    #[error("Unsupported control message type: {kind}")]
    UnsupportedControlMessage { kind: String },

    // Transcription errors
    #[error("Transcription model not found at {path}")]
    ModelNotFound { path: String },

    #[error("Transcription inference failed: {message}")]
    InferenceFailed { message: String },

    #[error("Transcription error: {message}")]
    Transcription { message: String },

    // Storage errors
    #[error("Failed to persist session: {message}")]
    Persist { message: String },

    #[error("WAV encoding error: {0}")]
    Wav(#[from] hound::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ScribeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn invalid_frame_size_display() {
        let error = ScribeError::InvalidFrameSize {
            expected: 640,
            actual: 639,
        };
        assert_eq!(
            error.to_string(),
            "Invalid frame size: expected 640 bytes, got 639"
        );
    }

    #[test]
    fn no_active_session_display() {
        assert_eq!(
            ScribeError::NoActiveSession.to_string(),
            "Audio received before session.start"
        );
    }

    #[test]
    fn unsupported_control_message_display() {
        let error = ScribeError::UnsupportedControlMessage {
            kind: "session.pause".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unsupported control message type: session.pause"
        );
    }

    #[test]
    fn inference_failed_display() {
        let error = ScribeError::InferenceFailed {
            message: "out of memory".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Transcription inference failed: out of memory"
        );
    }

    #[test]
    fn from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: ScribeError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let error: ScribeError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<ScribeError>();
        assert_sync::<ScribeError>();
    }
}
