//! WebSocket server.
//!
//! One route, `/ws`: binary messages are 20ms PCM frames, text messages
//! are JSON control messages. Each connection gets its own
//! [`SessionHost`] with its own segmenter, queue and worker; the shared
//! transcription engine is the only cross-connection state. `/health`
//! answers liveness probes.

pub mod handler;
pub mod protocol;

pub use handler::SessionHost;
pub use protocol::{ControlMessage, Event};

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::audio::VoiceActivity;
use crate::config::Config;
use crate::segment::SegmenterConfig;
use crate::storage::SessionWriter;
use crate::stt::{Transcriber, Warmup};

/// Shared pieces every connection needs.
pub struct AppState {
    pub transcriber: Arc<dyn Transcriber>,
    pub vad: Arc<dyn VoiceActivity>,
    pub segmenter_config: SegmenterConfig,
    pub writer: SessionWriter,
}

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
        .route(
            "/health",
            get(|| async { Json(serde_json::json!({"status": "ok"})) }),
        )
}

/// Binds the listener and serves until the process is stopped.
///
/// The engine warm-up runs in the background so the port is accepting
/// connections immediately.
pub async fn serve(config: &Config, transcriber: Arc<dyn Transcriber>) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        transcriber: Arc::clone(&transcriber),
        vad: Arc::new(crate::audio::EnergyVad::new(config.vad.rms_threshold)),
        segmenter_config: config.segmenter_config(),
        writer: SessionWriter::new(config.output_dir()),
    });

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("failed to parse listen address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let actual_addr = listener
        .local_addr()
        .context("failed to read local listener address")?;

    let warmup = Arc::new(Warmup::new());
    {
        let warmup = Arc::clone(&warmup);
        let engine = Arc::clone(&transcriber);
        tokio::task::spawn_blocking(move || warmup.ensure_ready(&engine));
    }

    tracing::info!(
        address = %actual_addr,
        model = state.transcriber.model_name(),
        output_dir = %state.writer.base_dir().display(),
        "meetscribe listening"
    );
    axum::serve(listener, router(state).into_make_service())
        .await
        .context("server error")?;

    Ok(())
}

async fn ws_handler(
    State(state): State<Arc<AppState>>,
    upgrade: WebSocketUpgrade,
) -> impl IntoResponse {
    upgrade.on_upgrade(move |socket| handle_socket(state, socket))
}

/// Drives one connection: splits the socket, forwards outbound events
/// from the host's channel, and routes inbound messages to the host.
async fn handle_socket(state: Arc<AppState>, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<Event>();

    let send_task = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            if sender.send(Message::Text(event.to_json())).await.is_err() {
                break;
            }
        }
    });

    let mut host = SessionHost::new(
        Arc::clone(&state.transcriber),
        Arc::clone(&state.vad),
        state.segmenter_config,
        state.writer.clone(),
        events_tx,
    );

    while let Some(Ok(message)) = receiver.next().await {
        match message {
            Message::Binary(bytes) => host.handle_frame(&bytes),
            Message::Text(text) => host.handle_control(&text).await,
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    // Drains and persists any session still active, then closes the
    // event channel so the sender task ends.
    host.shutdown().await;
    if let Err(e) = send_task.await {
        tracing::error!(error = %e, "event sender task failed");
    }
    tracing::debug!("connection closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stt::MockTranscriber;
    use tempfile::tempdir;

    #[tokio::test]
    async fn router_builds_with_mock_state() {
        let dir = tempdir().unwrap();
        let state = Arc::new(AppState {
            transcriber: Arc::new(MockTranscriber::new("m")),
            vad: Arc::new(crate::audio::EnergyVad::default()),
            segmenter_config: SegmenterConfig::default(),
            writer: SessionWriter::new(dir.path()),
        });
        let _router = router(state);
    }
}
