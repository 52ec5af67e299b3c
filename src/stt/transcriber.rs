use crate::defaults;
use crate::error::{Result, ScribeError};
use std::sync::{Arc, Mutex, OnceLock};

/// Raw engine output for one segment, before hallucination filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    /// Transcribed text, possibly empty.
    pub text: String,
    /// Engine's estimate that the segment contains no speech, when the
    /// engine exposes one. Engines that cannot report it leave this None
    /// and the filter skips probability-based suppression.
    pub no_speech_prob: Option<f32>,
}

impl Transcription {
    pub fn new(text: impl Into<String>, no_speech_prob: Option<f32>) -> Self {
        Self {
            text: text.into(),
            no_speech_prob,
        }
    }
}

/// Trait for speech-to-text transcription.
///
/// This trait allows swapping implementations (real Whisper vs mock).
/// Implementations may block; callers run them off the async path.
pub trait Transcriber: Send + Sync {
    /// Transcribe audio samples to text.
    ///
    /// # Arguments
    /// * `audio` - Audio samples as 16-bit PCM at 16kHz mono
    fn transcribe(&self, audio: &[i16]) -> Result<Transcription>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;

    /// Check if the transcriber is ready
    fn is_ready(&self) -> bool;
}

/// Implement Transcriber for Arc<T> to allow sharing across sessions.
impl<T: Transcriber + ?Sized> Transcriber for Arc<T> {
    fn transcribe(&self, audio: &[i16]) -> Result<Transcription> {
        (**self).transcribe(audio)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// One-shot engine warm-up.
///
/// The first inference of a freshly loaded model pays page-in and cache
/// costs; running a second of silence through it at startup moves that
/// cost off the first real utterance. Idempotent and thread-safe.
pub struct Warmup {
    done: OnceLock<()>,
}

impl Warmup {
    pub fn new() -> Self {
        Self {
            done: OnceLock::new(),
        }
    }

    /// Runs the warm-up inference once; later calls return immediately.
    pub fn ensure_ready<T: Transcriber>(&self, transcriber: &T) {
        self.done.get_or_init(|| {
            let silent = vec![0i16; defaults::SAMPLE_RATE as usize];
            if let Err(e) = transcriber.transcribe(&silent) {
                tracing::warn!(error = %e, "transcriber warm-up failed");
            }
        });
    }

    pub fn is_warm(&self) -> bool {
        self.done.get().is_some()
    }
}

impl Default for Warmup {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock transcriber for testing
#[derive(Debug)]
pub struct MockTranscriber {
    model_name: String,
    responses: Mutex<Vec<Transcription>>,
    fallback: Transcription,
    should_fail: bool,
    calls: Mutex<Vec<usize>>,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            responses: Mutex::new(Vec::new()),
            fallback: Transcription::new("mock transcription", None),
            should_fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Configure the mock to always return a specific response
    pub fn with_response(mut self, text: &str) -> Self {
        self.fallback = Transcription::new(text, self.fallback.no_speech_prob);
        self
    }

    /// Configure the mock to report a no-speech probability
    pub fn with_no_speech_prob(mut self, prob: f32) -> Self {
        self.fallback.no_speech_prob = Some(prob);
        self
    }

    /// Queue responses returned in order before falling back
    pub fn with_queued(self, responses: Vec<Transcription>) -> Self {
        let mut queued = responses;
        queued.reverse();
        *self.responses.lock().unwrap() = queued;
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Sample counts of every transcribe call, in order.
    pub fn call_sizes(&self) -> Vec<usize> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, audio: &[i16]) -> Result<Transcription> {
        self.calls.lock().unwrap().push(audio.len());
        if self.should_fail {
            return Err(ScribeError::Transcription {
                message: "mock transcription failure".to_string(),
            });
        }
        match self.responses.lock().unwrap().pop() {
            Some(response) => Ok(response),
            None => Ok(self.fallback.clone()),
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}
