//! Per-session transcript and audio accumulation.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::defaults;

/// One finalized line of the meeting transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptEntry {
    pub segment_id: u64,
    /// Wall-clock time of finalization, formatted `%H:%M`.
    pub timestamp: String,
    pub speaker: String,
    pub text: String,
}

impl TranscriptEntry {
    /// Creates an entry stamped with the current local time and the
    /// default speaker label.
    pub fn now(segment_id: u64, text: impl Into<String>) -> Self {
        Self {
            segment_id,
            timestamp: Local::now().format("%H:%M").to_string(),
            speaker: defaults::SPEAKER.to_string(),
            text: text.into(),
        }
    }
}

/// Everything accumulated between `session.start` and persistence:
/// raw session audio, finalized transcript lines and the derived title.
#[derive(Debug, Clone)]
pub struct SessionLog {
    pub started_at: DateTime<Local>,
    audio: Vec<i16>,
    transcript: Vec<TranscriptEntry>,
    title: String,
}

impl SessionLog {
    pub fn new() -> Self {
        Self {
            started_at: Local::now(),
            audio: Vec::new(),
            transcript: Vec::new(),
            title: String::new(),
        }
    }

    /// Appends raw frame samples. Every accepted frame lands here, speech
    /// or not; the WAV on disk is the whole session.
    pub fn push_audio(&mut self, samples: &[i16]) {
        self.audio.extend_from_slice(samples);
    }

    /// Records a finalized transcript line and rederives the title from
    /// it. The newest non-empty final always wins the title.
    pub fn add_final(&mut self, entry: TranscriptEntry) -> Option<String> {
        let title = crate::stt::title_from_text(&entry.text, defaults::TITLE_WORDS);
        self.transcript.push(entry);
        if title.is_empty() {
            None
        } else {
            self.title = title.clone();
            Some(title)
        }
    }

    pub fn audio(&self) -> &[i16] {
        &self.audio
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Session audio duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.audio.len() as f64 / defaults::SAMPLE_RATE as f64
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}
