//! Default configuration constants for meetscribe.
//!
//! This module provides shared constants used across the segmenter, the
//! dispatch layer and the hallucination filter, so tuning lives in one place.

/// Audio sample rate in Hz.
///
/// 16kHz mono is the contract of the streaming protocol; every frame the
/// client sends is interpreted at this rate.
pub const SAMPLE_RATE: u32 = 16000;

/// Samples per streaming frame (20ms at 16kHz).
pub const FRAME_SAMPLES: usize = 320;

/// Bytes per streaming frame (16-bit little-endian PCM).
pub const FRAME_BYTES: usize = FRAME_SAMPLES * 2;

/// Duration of one streaming frame in milliseconds.
pub const FRAME_MS: u32 = 20;

/// Default WebSocket listen port.
pub const PORT: u16 = 8766;

/// Default RMS threshold (raw int16 units) for the energy VAD.
///
/// Frames at or above this RMS count as speech. Tuned for typical
/// laptop/headset microphones at normal speaking distance.
pub const VAD_RMS_THRESHOLD: f32 = 500.0;

/// Audio kept before detected speech onset, in milliseconds.
///
/// Soft onsets (plosives, fricatives) cross the VAD threshold late;
/// the pre-roll ring buffer recovers them.
pub const PRE_ROLL_MS: u32 = 300;

/// Trailing silence before an utterance is finalized, in milliseconds.
///
/// 600ms tolerates intra-sentence pauses without splitting the utterance.
pub const SILENCE_HANGOVER_MS: u32 = 600;

/// Minimum utterance length worth transcribing, in milliseconds.
///
/// Shorter bursts (coughs, chair squeaks) are discarded without emitting
/// a segment.
pub const MIN_UTTERANCE_MS: u32 = 800;

/// Hard cap on utterance length, in milliseconds.
///
/// Utterances are force-finalized at this length so long monologues still
/// produce timely finals and bounded transcription jobs.
pub const MAX_UTTERANCE_MS: u32 = 8000;

/// Cadence of interim (partial) segments during ongoing speech, in milliseconds.
pub const PARTIAL_INTERVAL_MS: u32 = 1000;

/// Audio window carried by a partial segment, in milliseconds.
///
/// Partials carry only the freshest tail of the utterance so interim
/// transcription latency stays flat as the utterance grows.
pub const PARTIAL_WINDOW_MS: u32 = 2500;

/// Minimum segment RMS (raw int16 units) for transcription to run at all.
///
/// Segments below this are ambient noise; the engine is never invoked.
pub const MIN_RMS_FOR_TRANSCRIPTION: f32 = 90.0;

/// Minimum segment RMS (raw int16 units) for a known hallucination phrase
/// to be trusted as real speech rather than suppressed.
pub const MIN_RMS_FOR_KNOWN_HALLUCINATIONS: f32 = 230.0;

/// No-speech probability above which any transcription result is suppressed.
pub const NO_SPEECH_SUPPRESS_THRESHOLD: f32 = 0.78;

/// No-speech probability above which a known hallucination phrase is
/// suppressed regardless of signal level.
pub const NO_SPEECH_HALLUCINATION_THRESHOLD: f32 = 0.45;

/// Maximum partial segments admitted to the dispatch queue.
///
/// When the backlog reaches this depth, new partials are dropped at
/// admission; finals are always admitted.
pub const MAX_PARTIAL_BACKLOG: usize = 3;

/// Default transcription language code.
pub const LANGUAGE: &str = "es";

/// Speaker label used for transcript entries.
///
/// Diarization is out of scope; every entry carries this placeholder.
pub const SPEAKER: &str = "Locutor";

/// Number of leading words used to derive a meeting title.
pub const TITLE_WORDS: usize = 8;

/// Phrases Whisper is known to hallucinate on near-silent Spanish audio.
///
/// Compared against normalized text (lowercased, accents stripped,
/// punctuation trimmed). Matches are suppressed unless the segment is
/// loud enough and the engine is confident speech was present.
pub const KNOWN_HALLUCINATIONS: &[&str] = &[
    "gracias",
    "gracias!",
    "gracias por ver",
    "suscribete",
    "suscribete al canal",
    "suscribete a mi canal",
    "suscribete a nuestro canal",
];

/// Convert a millisecond duration to a whole number of streaming frames.
pub const fn ms_to_frames(ms: u32) -> usize {
    (ms / FRAME_MS) as usize
}

/// Convert a millisecond duration to a sample count at [`SAMPLE_RATE`].
pub const fn ms_to_samples(ms: u32) -> usize {
    (ms as usize * SAMPLE_RATE as usize) / 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_geometry_is_consistent() {
        assert_eq!(FRAME_BYTES, 640);
        assert_eq!(ms_to_samples(FRAME_MS), FRAME_SAMPLES);
    }

    #[test]
    fn ms_to_frames_truncates() {
        assert_eq!(ms_to_frames(600), 30);
        assert_eq!(ms_to_frames(610), 30);
    }

    #[test]
    fn partial_window_fits_in_max_utterance() {
        assert!(PARTIAL_WINDOW_MS < MAX_UTTERANCE_MS);
        assert!(MIN_UTTERANCE_MS < MAX_UTTERANCE_MS);
    }
}
