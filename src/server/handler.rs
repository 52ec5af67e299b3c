//! Per-connection session host.
//!
//! Owns everything one client connection needs: the segmenter, the
//! dispatch queue, the transcription worker and the session log. The
//! transport layer feeds it raw binary frames and control text; it
//! answers through the outbound event channel, so it stays independent
//! of the WebSocket glue and directly testable.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::audio::{self, VoiceActivity};
use crate::dispatch::{self, DispatchQueue};
use crate::segment::{SegmenterConfig, SpeechSegmenter};
use crate::server::protocol::{ControlMessage, Event};
use crate::session::SessionLog;
use crate::storage::SessionWriter;
use crate::stt::Transcriber;

pub struct SessionHost {
    segmenter: SpeechSegmenter<Arc<dyn VoiceActivity>>,
    queue: DispatchQueue,
    session: Arc<Mutex<SessionLog>>,
    events: mpsc::UnboundedSender<Event>,
    writer: SessionWriter,
    worker: tokio::task::JoinHandle<()>,
    active: bool,
}

impl SessionHost {
    /// Builds a host and spawns its transcription worker.
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        vad: Arc<dyn VoiceActivity>,
        segmenter_config: SegmenterConfig,
        writer: SessionWriter,
        events: mpsc::UnboundedSender<Event>,
    ) -> Self {
        let (queue, rx) = dispatch::channel();
        let session = Arc::new(Mutex::new(SessionLog::new()));
        let worker = tokio::spawn(dispatch::worker::run(
            rx,
            transcriber,
            Arc::clone(&session),
            events.clone(),
        ));

        Self {
            segmenter: SpeechSegmenter::new(vad, segmenter_config),
            queue,
            session,
            events,
            writer,
            worker,
            active: false,
        }
    }

    /// True between `session.start` and `session.stop`.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Ingests one binary audio frame.
    ///
    /// Frames outside a session and malformed frames produce an error
    /// event and are otherwise ignored; the session log only ever holds
    /// frames the segmenter accepted.
    pub fn handle_frame(&mut self, bytes: &[u8]) {
        if !self.active {
            self.send(Event::error(crate::error::ScribeError::NoActiveSession));
            return;
        }

        let samples = match audio::decode_frame(bytes) {
            Ok(samples) => samples,
            Err(e) => {
                self.send(Event::error(e));
                return;
            }
        };

        let tasks = match self.segmenter.push_frame(&samples) {
            Ok(tasks) => tasks,
            Err(e) => {
                self.send(Event::error(e));
                return;
            }
        };

        self.session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_audio(&samples);
        self.queue.admit(tasks);
    }

    /// Handles one text control message.
    pub async fn handle_control(&mut self, text: &str) {
        match ControlMessage::parse(text) {
            Ok(ControlMessage::SessionStart) => self.start_session(),
            Ok(ControlMessage::SessionStop) => self.stop_session().await,
            Err(e) => self.send(Event::error(e)),
        }
    }

    fn start_session(&mut self) {
        self.segmenter.reset();
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = SessionLog::new();
        self.active = true;
        tracing::info!("session started");
        self.send(Event::SessionReady);
    }

    /// Stops the session: flushes trailing speech, waits for the worker
    /// to finish every admitted task, persists, and reports the paths.
    async fn stop_session(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        let finals = self.segmenter.flush();
        self.queue.admit(finals);
        self.queue.join().await;

        match self.persist().await {
            Ok(saved) => self.send(Event::SessionSaved {
                session_dir: saved.session_dir.to_string_lossy().to_string(),
                audio_path: saved.audio_path.to_string_lossy().to_string(),
                transcript_path: saved.transcript_path.to_string_lossy().to_string(),
            }),
            Err(e) => {
                tracing::error!(error = %e, "failed to persist session");
                self.send(Event::error(e));
            }
        }
    }

    async fn persist(&self) -> crate::error::Result<crate::storage::SavedSession> {
        let snapshot = self
            .session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let writer = self.writer.clone();
        tokio::task::spawn_blocking(move || writer.persist(&snapshot))
            .await
            .map_err(|e| crate::error::ScribeError::Persist {
                message: e.to_string(),
            })?
    }

    /// Connection teardown. A session still active at disconnect is
    /// drained and persisted exactly like an explicit stop; the saved
    /// event is sent best effort.
    pub async fn shutdown(mut self) {
        if self.active {
            tracing::info!("disconnect with active session, persisting");
            self.stop_session().await;
        }

        // Closing the queue lets the worker drain out and exit.
        let Self { queue, worker, .. } = self;
        drop(queue);
        if let Err(e) = worker.await {
            tracing::error!(error = %e, "transcription worker failed");
        }
    }

    fn send(&self, event: Event) {
        // The receiver disappears on disconnect; shutdown still has to run.
        let _ = self.events.send(event);
    }
}
