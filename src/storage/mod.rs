//! Session persistence.
//!
//! Each session lands in its own directory under the configured base,
//! named after the session start time, holding the full session audio as
//! a WAV file and the finalized transcript as JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::Result;
use crate::session::{SessionLog, TranscriptEntry};

/// On-disk schema of `transcript.json`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptFile {
    pub meeting_title: String,
    /// Session start, RFC 3339 with local offset.
    pub created_at: String,
    pub sample_rate: u32,
    /// Absolute path of the session WAV.
    pub audio_file: String,
    pub transcript: Vec<TranscriptEntry>,
}

/// Paths produced by a successful persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedSession {
    pub session_dir: PathBuf,
    pub audio_path: PathBuf,
    pub transcript_path: PathBuf,
}

/// Writes finished sessions below a base directory.
#[derive(Debug, Clone)]
pub struct SessionWriter {
    base_dir: PathBuf,
}

impl SessionWriter {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Default output location: `~/Documents/Meetscribe`, falling back to
    /// the home directory, then the current directory.
    pub fn default_base_dir() -> PathBuf {
        dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Meetscribe")
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Persists one session: `audio.wav` plus `transcript.json` in a
    /// directory named after the session start time.
    pub fn persist(&self, log: &SessionLog) -> Result<SavedSession> {
        let session_dir = self
            .base_dir
            .join(log.started_at.format("%Y%m%d-%H%M%S").to_string());
        std::fs::create_dir_all(&session_dir)?;

        let audio_path = session_dir.join("audio.wav");
        let transcript_path = session_dir.join("transcript.json");

        write_wav(&audio_path, log.audio())?;

        let payload = TranscriptFile {
            meeting_title: log.title().to_string(),
            created_at: log.started_at.to_rfc3339(),
            sample_rate: defaults::SAMPLE_RATE,
            audio_file: audio_path.to_string_lossy().to_string(),
            transcript: log.transcript().to_vec(),
        };
        let json = serde_json::to_string_pretty(&payload).map_err(std::io::Error::other)?;
        std::fs::write(&transcript_path, json)?;

        tracing::info!(
            dir = %session_dir.display(),
            entries = log.transcript().len(),
            secs = log.duration_secs(),
            "session persisted"
        );

        Ok(SavedSession {
            session_dir,
            audio_path,
            transcript_path,
        })
    }
}

/// Writes mono 16-bit PCM samples as a WAV file at the streaming rate.
pub fn write_wav(path: &Path, samples: &[i16]) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: defaults::SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TranscriptEntry;
    use tempfile::tempdir;

    #[test]
    fn write_wav_round_trips_samples() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audio.wav");
        let samples: Vec<i16> = (0..1000).map(|i| (i % 300) as i16).collect();

        write_wav(&path, &samples).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16000);
        assert_eq!(spec.bits_per_sample, 16);

        let read: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(read, samples);
    }

    #[test]
    fn write_wav_handles_empty_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audio.wav");
        write_wav(&path, &[]).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 0);
    }

    #[test]
    fn persist_writes_audio_and_transcript() {
        let dir = tempdir().unwrap();
        let writer = SessionWriter::new(dir.path());

        let mut log = SessionLog::new();
        log.push_audio(&vec![100i16; 16000]);
        log.add_final(TranscriptEntry {
            segment_id: 0,
            timestamp: "12:30".to_string(),
            speaker: "Locutor".to_string(),
            text: "hola a todos".to_string(),
        });

        let saved = writer.persist(&log).unwrap();
        assert!(saved.audio_path.exists());
        assert!(saved.transcript_path.exists());
        assert!(saved.session_dir.starts_with(dir.path()));

        // Directory name is the start time.
        let name = saved
            .session_dir
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string();
        assert_eq!(name.len(), 15);
        assert_eq!(&name[8..9], "-");

        let parsed: TranscriptFile =
            serde_json::from_str(&std::fs::read_to_string(&saved.transcript_path).unwrap())
                .unwrap();
        assert_eq!(parsed.meeting_title, "hola a todos");
        assert_eq!(parsed.sample_rate, 16000);
        assert_eq!(parsed.transcript.len(), 1);
        assert_eq!(parsed.transcript[0].text, "hola a todos");
        assert_eq!(
            parsed.audio_file,
            saved.audio_path.to_string_lossy().to_string()
        );
        assert!(parsed.created_at.starts_with("20"));
    }

    #[test]
    fn persist_empty_transcript_still_saves_audio() {
        let dir = tempdir().unwrap();
        let writer = SessionWriter::new(dir.path());

        let mut log = SessionLog::new();
        log.push_audio(&vec![0i16; 320]);

        let saved = writer.persist(&log).unwrap();
        let parsed: TranscriptFile =
            serde_json::from_str(&std::fs::read_to_string(&saved.transcript_path).unwrap())
                .unwrap();
        assert_eq!(parsed.meeting_title, "");
        assert!(parsed.transcript.is_empty());
    }
}
