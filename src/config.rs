use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::defaults;
use crate::segment::SegmenterConfig;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub vad: VadConfig,
    pub stt: SttConfig,
    pub storage: StorageConfig,
}

/// WebSocket server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Voice activity detection and segmentation timing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VadConfig {
    pub rms_threshold: f32,
    pub pre_roll_ms: u32,
    pub silence_hangover_ms: u32,
    pub min_utterance_ms: u32,
    pub max_utterance_ms: u32,
    pub partial_interval_ms: u32,
    pub partial_window_ms: u32,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub model_path: Option<PathBuf>,
    pub language: String,
    pub threads: Option<usize>,
}

/// Session output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory for saved sessions. Defaults to
    /// ~/Documents/Meetscribe when unset.
    pub output_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: defaults::PORT,
        }
    }
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            rms_threshold: defaults::VAD_RMS_THRESHOLD,
            pre_roll_ms: defaults::PRE_ROLL_MS,
            silence_hangover_ms: defaults::SILENCE_HANGOVER_MS,
            min_utterance_ms: defaults::MIN_UTTERANCE_MS,
            max_utterance_ms: defaults::MAX_UTTERANCE_MS,
            partial_interval_ms: defaults::PARTIAL_INTERVAL_MS,
            partial_window_ms: defaults::PARTIAL_WINDOW_MS,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            language: defaults::LANGUAGE.to_string(),
            threads: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - MEETSCRIBE_PORT → server.port
    /// - MEETSCRIBE_MODEL → stt.model_path
    /// - MEETSCRIBE_LANGUAGE → stt.language
    /// - MEETSCRIBE_OUTPUT_DIR → storage.output_dir
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("MEETSCRIBE_PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
        }

        if let Ok(model) = std::env::var("MEETSCRIBE_MODEL")
            && !model.is_empty()
        {
            self.stt.model_path = Some(PathBuf::from(model));
        }

        if let Ok(language) = std::env::var("MEETSCRIBE_LANGUAGE")
            && !language.is_empty()
        {
            self.stt.language = language;
        }

        if let Ok(dir) = std::env::var("MEETSCRIBE_OUTPUT_DIR")
            && !dir.is_empty()
        {
            self.storage.output_dir = Some(PathBuf::from(dir));
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/meetscribe/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .expect("Could not determine config directory")
            .join("meetscribe")
            .join("config.toml")
    }

    /// Segmenter timing derived from the `[vad]` table.
    pub fn segmenter_config(&self) -> SegmenterConfig {
        SegmenterConfig {
            pre_roll_ms: self.vad.pre_roll_ms,
            silence_hangover_ms: self.vad.silence_hangover_ms,
            min_utterance_ms: self.vad.min_utterance_ms,
            max_utterance_ms: self.vad.max_utterance_ms,
            partial_interval_ms: self.vad.partial_interval_ms,
            partial_window_ms: self.vad.partial_window_ms,
        }
    }

    /// Resolved session output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.storage
            .output_dir
            .clone()
            .unwrap_or_else(crate::storage::SessionWriter::default_base_dir)
    }
}
