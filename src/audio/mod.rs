//! Audio primitives: PCM frame decoding and voice activity detection.

pub mod vad;

pub use vad::{EnergyVad, VoiceActivity, calculate_rms};

use crate::defaults;
use crate::error::{Result, ScribeError};

/// Decode one little-endian 16-bit PCM frame into samples.
///
/// The streaming protocol carries exactly [`defaults::FRAME_BYTES`] bytes
/// per frame; any other length is a protocol violation.
pub fn decode_frame(bytes: &[u8]) -> Result<Vec<i16>> {
    if bytes.len() != defaults::FRAME_BYTES {
        return Err(ScribeError::InvalidFrameSize {
            expected: defaults::FRAME_BYTES,
            actual: bytes.len(),
        });
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Encode samples back to little-endian 16-bit PCM bytes.
pub fn encode_samples(samples: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_frame_accepts_exact_size() {
        let bytes = vec![0u8; defaults::FRAME_BYTES];
        let samples = decode_frame(&bytes).unwrap();
        assert_eq!(samples.len(), defaults::FRAME_SAMPLES);
    }

    #[test]
    fn decode_frame_rejects_short_frame() {
        let err = decode_frame(&[0u8; 100]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid frame size: expected 640 bytes, got 100"
        );
    }

    #[test]
    fn decode_frame_rejects_long_frame() {
        assert!(decode_frame(&vec![0u8; defaults::FRAME_BYTES + 2]).is_err());
    }

    #[test]
    fn decode_frame_is_little_endian() {
        let mut bytes = vec![0u8; defaults::FRAME_BYTES];
        bytes[0] = 0x01;
        bytes[1] = 0x02;
        let samples = decode_frame(&bytes).unwrap();
        assert_eq!(samples[0], 0x0201);
    }

    #[test]
    fn encode_round_trips_decode() {
        let samples: Vec<i16> = (0..defaults::FRAME_SAMPLES as i16).collect();
        let bytes = encode_samples(&samples);
        assert_eq!(decode_frame(&bytes).unwrap(), samples);
    }
}
