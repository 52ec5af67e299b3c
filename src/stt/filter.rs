//! Transcript hallucination filtering.
//!
//! Whisper-family models invent stock phrases ("gracias por ver",
//! "suscribete al canal") on near-silent audio. The filter compares
//! normalized output against a curated phrase list and suppresses matches
//! unless the segment was loud enough and the engine was confident speech
//! was present. It also applies a blanket no-speech suppression threshold.

use std::sync::OnceLock;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::defaults;

/// Canonical form used for phrase comparison: lowercased, accents
/// stripped, everything outside `[a-z0-9 ]` collapsed to single spaces.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let without_accents: String = lowered
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    let alnum_spaces: String = without_accents
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    alnum_spaces.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn known_hallucinations_normalized() -> &'static Vec<String> {
    static NORMALIZED: OnceLock<Vec<String>> = OnceLock::new();
    NORMALIZED.get_or_init(|| {
        defaults::KNOWN_HALLUCINATIONS
            .iter()
            .map(|phrase| normalize_text(phrase))
            .collect()
    })
}

/// Applies hallucination suppression to raw engine output.
///
/// # Arguments
/// * `text` - Raw transcription text
/// * `rms` - RMS energy of the transcribed segment, raw int16 units
/// * `no_speech_prob` - Engine no-speech estimate, if available
///
/// # Returns
/// The trimmed text, or an empty string when the result is suppressed.
pub fn clean_transcript(text: &str, rms: f32, no_speech_prob: Option<f32>) -> String {
    let cleaned = text.trim();
    if cleaned.is_empty() {
        return String::new();
    }

    let norm = normalize_text(cleaned);
    if norm.is_empty() {
        return String::new();
    }

    if let Some(prob) = no_speech_prob
        && prob >= defaults::NO_SPEECH_SUPPRESS_THRESHOLD
    {
        return String::new();
    }

    if known_hallucinations_normalized().iter().any(|p| *p == norm) {
        let quiet = rms < defaults::MIN_RMS_FOR_KNOWN_HALLUCINATIONS;
        let doubtful = no_speech_prob
            .is_some_and(|prob| prob >= defaults::NO_SPEECH_HALLUCINATION_THRESHOLD);
        if quiet || doubtful {
            return String::new();
        }
    }

    cleaned.to_string()
}

/// Derives a meeting title from transcript text: its first `max_words`
/// whitespace-separated words.
pub fn title_from_text(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_strips_accents() {
        assert_eq!(normalize_text("Suscríbete al CANAL"), "suscribete al canal");
        assert_eq!(normalize_text("  ¡Gracias!  "), "gracias");
    }

    #[test]
    fn normalize_collapses_punctuation_and_whitespace() {
        assert_eq!(normalize_text("hola, ¿qué tal?"), "hola que tal");
        assert_eq!(normalize_text("uno   dos\t tres"), "uno dos tres");
    }

    #[test]
    fn normalize_pure_punctuation_is_empty() {
        assert_eq!(normalize_text("...!!"), "");
    }

    #[test]
    fn real_speech_passes_through() {
        let text = clean_transcript("  Hola, bienvenidos a la reunión.  ", 300.0, Some(0.1));
        assert_eq!(text, "Hola, bienvenidos a la reunión.");
    }

    #[test]
    fn quiet_known_hallucination_is_suppressed() {
        // RMS 120 clears the transcription floor but not the hallucination
        // confidence floor of 230.
        assert_eq!(clean_transcript("Gracias.", 120.0, None), "");
        assert_eq!(clean_transcript("Suscríbete al canal", 120.0, Some(0.2)), "");
    }

    #[test]
    fn loud_confident_known_phrase_is_kept() {
        let text = clean_transcript("Gracias.", 300.0, Some(0.2));
        assert_eq!(text, "Gracias.");
    }

    #[test]
    fn loud_but_doubtful_known_phrase_is_suppressed() {
        assert_eq!(clean_transcript("Gracias.", 300.0, Some(0.5)), "");
    }

    #[test]
    fn known_phrase_without_prob_relies_on_rms_alone() {
        assert_eq!(clean_transcript("Gracias.", 300.0, None), "Gracias.");
        assert_eq!(clean_transcript("Gracias.", 120.0, None), "");
    }

    #[test]
    fn high_no_speech_prob_suppresses_anything() {
        assert_eq!(clean_transcript("texto cualquiera", 500.0, Some(0.9)), "");
        assert_eq!(clean_transcript("texto cualquiera", 500.0, Some(0.78)), "");
    }

    #[test]
    fn prob_just_below_threshold_is_kept() {
        assert_eq!(
            clean_transcript("texto cualquiera", 500.0, Some(0.77)),
            "texto cualquiera"
        );
    }

    #[test]
    fn empty_and_punctuation_only_are_dropped() {
        assert_eq!(clean_transcript("", 500.0, None), "");
        assert_eq!(clean_transcript("   ", 500.0, None), "");
        assert_eq!(clean_transcript("...", 500.0, None), "");
    }

    #[test]
    fn title_takes_leading_words() {
        assert_eq!(
            title_from_text("uno dos tres cuatro cinco seis siete ocho nueve diez", 8),
            "uno dos tres cuatro cinco seis siete ocho"
        );
    }

    #[test]
    fn title_of_short_text_is_whole_text() {
        assert_eq!(title_from_text("  hola  mundo  ", 8), "hola mundo");
        assert_eq!(title_from_text("", 8), "");
    }
}
