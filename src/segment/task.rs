//! Segment payloads produced by the speech segmenter.

use crate::audio::calculate_rms;
use crate::defaults;

/// Whether a segment is an interim window or a completed utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Interim snapshot of an ongoing utterance; superseded by later
    /// segments of the same utterance.
    Partial,
    /// Completed utterance; must always be transcribed.
    Final,
}

impl SegmentKind {
    /// Wire/name form, matching the transcript event names.
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Partial => "partial",
            SegmentKind::Final => "final",
        }
    }
}

/// One unit of work for the transcription dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentTask {
    pub kind: SegmentKind,
    /// Utterance number within the session. Partials carry the id of the
    /// utterance in progress; the same id later appears on its final.
    pub segment_id: u64,
    /// Mono 16kHz PCM samples for this segment.
    pub samples: Vec<i16>,
}

impl SegmentTask {
    pub fn new(kind: SegmentKind, segment_id: u64, samples: Vec<i16>) -> Self {
        Self {
            kind,
            segment_id,
            samples,
        }
    }

    pub fn is_partial(&self) -> bool {
        self.kind == SegmentKind::Partial
    }

    pub fn is_final(&self) -> bool {
        self.kind == SegmentKind::Final
    }

    /// Segment duration in milliseconds at the streaming sample rate.
    pub fn duration_ms(&self) -> u32 {
        (self.samples.len() as u64 * 1000 / defaults::SAMPLE_RATE as u64) as u32
    }

    /// RMS energy of the segment in raw int16 units.
    pub fn rms(&self) -> f32 {
        calculate_rms(&self.samples)
    }
}
