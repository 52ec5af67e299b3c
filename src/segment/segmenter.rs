//! Speech segmentation state machine.
//!
//! Consumes 20ms PCM frames and a per-frame VAD verdict, and emits
//! [`SegmentTask`]s: interim partial windows on a fixed cadence while an
//! utterance is in progress, and a final segment when the utterance ends
//! through trailing silence, the length cap or an explicit flush.

use std::collections::VecDeque;

use crate::audio::VoiceActivity;
use crate::defaults;
use crate::error::{Result, ScribeError};
use crate::segment::{SegmentKind, SegmentTask};

/// Segmenter timing parameters, all in milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct SegmenterConfig {
    /// Audio retained before speech onset.
    pub pre_roll_ms: u32,
    /// Trailing silence that ends an utterance.
    pub silence_hangover_ms: u32,
    /// Utterances shorter than this are discarded.
    pub min_utterance_ms: u32,
    /// Utterances are force-finalized at this length.
    pub max_utterance_ms: u32,
    /// Cadence of partial segments during ongoing speech.
    pub partial_interval_ms: u32,
    /// Audio window carried by each partial.
    pub partial_window_ms: u32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            pre_roll_ms: defaults::PRE_ROLL_MS,
            silence_hangover_ms: defaults::SILENCE_HANGOVER_MS,
            min_utterance_ms: defaults::MIN_UTTERANCE_MS,
            max_utterance_ms: defaults::MAX_UTTERANCE_MS,
            partial_interval_ms: defaults::PARTIAL_INTERVAL_MS,
            partial_window_ms: defaults::PARTIAL_WINDOW_MS,
        }
    }
}

/// VAD-driven utterance segmenter.
///
/// Frame-count based: all timing derives from the number of 20ms frames
/// pushed, never from wall-clock time, so behavior is deterministic and
/// independent of network jitter.
pub struct SpeechSegmenter<V: VoiceActivity> {
    vad: V,
    pre_roll_frames: usize,
    silence_hangover_frames: usize,
    min_utterance_frames: usize,
    max_utterance_frames: usize,
    partial_interval_frames: usize,
    partial_window_frames: usize,

    pre_roll: VecDeque<Vec<i16>>,
    speech_frames: Vec<Vec<i16>>,
    in_speech: bool,
    silence_run: usize,
    last_partial_at: usize,
    segment_id: u64,
}

impl<V: VoiceActivity> SpeechSegmenter<V> {
    pub fn new(vad: V, config: SegmenterConfig) -> Self {
        Self {
            vad,
            pre_roll_frames: defaults::ms_to_frames(config.pre_roll_ms),
            silence_hangover_frames: defaults::ms_to_frames(config.silence_hangover_ms),
            min_utterance_frames: defaults::ms_to_frames(config.min_utterance_ms),
            max_utterance_frames: defaults::ms_to_frames(config.max_utterance_ms),
            partial_interval_frames: defaults::ms_to_frames(config.partial_interval_ms),
            partial_window_frames: defaults::ms_to_frames(config.partial_window_ms),
            pre_roll: VecDeque::new(),
            speech_frames: Vec::new(),
            in_speech: false,
            silence_run: 0,
            last_partial_at: 0,
            segment_id: 0,
        }
    }

    /// True while an utterance is being accumulated.
    pub fn in_speech(&self) -> bool {
        self.in_speech
    }

    /// Clears all buffered state and restarts utterance numbering.
    ///
    /// Called on session boundaries so each session's finals are numbered
    /// from 0.
    pub fn reset(&mut self) {
        self.pre_roll.clear();
        self.speech_frames.clear();
        self.in_speech = false;
        self.silence_run = 0;
        self.last_partial_at = 0;
        self.segment_id = 0;
    }

    /// Processes one 20ms frame and returns the segments it produced.
    ///
    /// A single frame can produce up to two tasks: a partial (cadence due)
    /// followed by a final (hangover expired on the same frame).
    pub fn push_frame(&mut self, frame: &[i16]) -> Result<Vec<SegmentTask>> {
        if frame.len() != defaults::FRAME_SAMPLES {
            return Err(ScribeError::InvalidFrameSize {
                expected: defaults::FRAME_BYTES,
                actual: frame.len() * 2,
            });
        }

        let is_speech = self.vad.is_speech(frame, defaults::SAMPLE_RATE);

        // The pre-roll ring always tracks the newest frames, including the
        // onset frame itself.
        if self.pre_roll.len() == self.pre_roll_frames {
            self.pre_roll.pop_front();
        }
        self.pre_roll.push_back(frame.to_vec());

        let mut tasks = Vec::new();

        if !self.in_speech {
            if is_speech {
                self.start_utterance();
            }
            return Ok(tasks);
        }

        self.speech_frames.push(frame.to_vec());

        if is_speech {
            self.silence_run = 0;
        } else {
            self.silence_run += 1;
        }

        let utterance_len = self.speech_frames.len();

        if utterance_len >= self.min_utterance_frames
            && utterance_len - self.last_partial_at >= self.partial_interval_frames
        {
            tasks.push(SegmentTask::new(
                SegmentKind::Partial,
                self.segment_id,
                self.window_samples(),
            ));
            self.last_partial_at = utterance_len;
        }

        if self.silence_run >= self.silence_hangover_frames {
            if let Some(task) = self.finalize_utterance() {
                tasks.push(task);
            }
            return Ok(tasks);
        }

        if utterance_len >= self.max_utterance_frames
            && let Some(task) = self.finalize_utterance()
        {
            tasks.push(task);
        }

        Ok(tasks)
    }

    /// Force-finalizes any utterance in progress.
    ///
    /// Called on session stop and disconnect so trailing speech is not
    /// lost. Utterances still below the minimum length are discarded.
    pub fn flush(&mut self) -> Vec<SegmentTask> {
        if !self.in_speech {
            return Vec::new();
        }
        self.finalize_utterance().into_iter().collect()
    }

    fn start_utterance(&mut self) {
        self.in_speech = true;
        self.silence_run = 0;
        self.last_partial_at = 0;
        // The onset frame is already in the pre-roll ring.
        self.speech_frames = self.pre_roll.iter().cloned().collect();
    }

    fn window_samples(&self) -> Vec<i16> {
        let start = self.speech_frames.len().saturating_sub(self.partial_window_frames);
        self.speech_frames[start..].concat()
    }

    fn finalize_utterance(&mut self) -> Option<SegmentTask> {
        let utterance_len = self.speech_frames.len();
        let samples = std::mem::take(&mut self.speech_frames).concat();

        self.in_speech = false;
        self.silence_run = 0;
        self.last_partial_at = 0;

        // Too short to be real speech: discard without consuming an id.
        if utterance_len < self.min_utterance_frames {
            return None;
        }

        let task = SegmentTask::new(SegmentKind::Final, self.segment_id, samples);
        self.segment_id += 1;
        Some(task)
    }
}
