//! Voice activity detection.
//!
//! Frame-level speech/silence classification using RMS energy in raw
//! int16 units. The segmenter consumes one verdict per 20ms frame; all
//! timing logic (hangover, pre-roll) lives there, not here.

use crate::defaults;

/// Trait for frame-level speech detection, allowing mock detectors in tests.
pub trait VoiceActivity: Send + Sync {
    /// Returns true if the frame contains speech.
    ///
    /// # Arguments
    /// * `samples` - One audio frame as 16-bit PCM
    /// * `sample_rate` - Sample rate in Hz
    fn is_speech(&self, samples: &[i16], sample_rate: u32) -> bool;
}

/// RMS-threshold voice activity detector.
///
/// Classifies a frame as speech when its RMS energy (raw int16 units)
/// meets the configured threshold.
#[derive(Debug, Clone, Copy)]
pub struct EnergyVad {
    threshold: f32,
}

impl EnergyVad {
    /// Creates a detector with the given RMS threshold (raw int16 units).
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Returns the configured RMS threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for EnergyVad {
    fn default() -> Self {
        Self::new(defaults::VAD_RMS_THRESHOLD)
    }
}

impl VoiceActivity for EnergyVad {
    fn is_speech(&self, samples: &[i16], _sample_rate: u32) -> bool {
        calculate_rms(samples) >= self.threshold
    }
}

impl<T: VoiceActivity + ?Sized> VoiceActivity for std::sync::Arc<T> {
    fn is_speech(&self, samples: &[i16], sample_rate: u32) -> bool {
        (**self).is_speech(samples, sample_rate)
    }
}

/// Calculates the Root Mean Square (RMS) of audio samples in raw int16 units.
///
/// # Arguments
/// * `samples` - Audio samples as 16-bit PCM
///
/// # Returns
/// RMS amplitude in the 0.0 to 32767.0 range, where 0.0 is silence and
/// ~23170.0 is a full-scale sine wave. Empty input yields 0.0.
pub fn calculate_rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&sample| {
            let s = sample as f64;
            s * s
        })
        .sum();

    let mean_square = sum_squares / samples.len() as f64;
    mean_square.sqrt() as f32
}
