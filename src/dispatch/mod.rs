//! Transcription dispatch: admission-controlled queue plus the
//! single-flight worker that drains it.

pub mod queue;
pub mod worker;

pub use queue::{DispatchQueue, TaskReceiver, channel};
pub use worker::transcribe_filtered;
