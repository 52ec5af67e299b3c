use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use meetscribe::Transcriber;
use meetscribe::config::Config;
use meetscribe::server;
use meetscribe::stt::{WhisperConfig, WhisperTranscriber};

/// Real-time meeting transcription server.
#[derive(Debug, Parser)]
#[command(name = "meetscribe", version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen port
    #[arg(short, long, env = "MEETSCRIBE_PORT")]
    port: Option<u16>,

    /// Path to the Whisper model file
    #[arg(short, long, env = "MEETSCRIBE_MODEL")]
    model: Option<PathBuf>,

    /// Transcription language code
    #[arg(short, long, env = "MEETSCRIBE_LANGUAGE")]
    language: Option<String>,

    /// Base directory for saved sessions
    #[arg(short, long, env = "MEETSCRIBE_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let transcriber = build_transcriber(&config)?;

    server::serve(&config, transcriber).await
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Resolution order: config file, then environment, then CLI flags.
fn load_config(cli: &Cli) -> Result<Config> {
    let path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_default(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))?
        .with_env_overrides();

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(model) = &cli.model {
        config.stt.model_path = Some(model.clone());
    }
    if let Some(language) = &cli.language {
        config.stt.language = language.clone();
    }
    if let Some(output_dir) = &cli.output_dir {
        config.storage.output_dir = Some(output_dir.clone());
    }

    Ok(config)
}

fn build_transcriber(config: &Config) -> Result<Arc<dyn Transcriber>> {
    let model_path = config.stt.model_path.clone().context(
        "no transcription model configured; set stt.model_path in the config file, \
         MEETSCRIBE_MODEL, or --model",
    )?;

    let transcriber = WhisperTranscriber::new(WhisperConfig {
        model_path,
        language: config.stt.language.clone(),
        threads: config.stt.threads,
    })?;

    if !transcriber.is_ready() {
        tracing::warn!(
            "built without the whisper feature; transcription requests will fail"
        );
    }

    Ok(Arc::new(transcriber))
}
