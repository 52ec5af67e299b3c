//! Single-flight transcription worker.
//!
//! One worker per connection drains the dispatch queue in order, runs the
//! blocking engine call on the blocking thread pool, filters the result
//! and emits transcript events. Finals are also recorded in the shared
//! session log so persistence sees them even after the socket closes.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::defaults;
use crate::dispatch::queue::TaskReceiver;
use crate::error::Result;
use crate::server::protocol::Event;
use crate::session::{SessionLog, TranscriptEntry};
use crate::stt::{Transcriber, Transcription, clean_transcript};

/// Runs the blocking gate-transcribe-filter pipeline for one segment.
///
/// Segments below the RMS floor never reach the engine. The returned
/// string is empty when the segment was gated or suppressed.
pub fn transcribe_filtered(transcriber: &dyn Transcriber, samples: &[i16]) -> Result<String> {
    if samples.is_empty() {
        return Ok(String::new());
    }

    let rms = crate::audio::calculate_rms(samples);
    if rms < defaults::MIN_RMS_FOR_TRANSCRIPTION {
        return Ok(String::new());
    }

    let Transcription {
        text,
        no_speech_prob,
    } = transcriber.transcribe(samples)?;

    Ok(clean_transcript(&text, rms, no_speech_prob))
}

/// Drains the queue until every producer handle is dropped.
///
/// Event send failures are ignored: after a disconnect the handler still
/// drains the queue so the session log is complete before persistence.
pub async fn run(
    mut rx: TaskReceiver,
    transcriber: Arc<dyn Transcriber>,
    session: Arc<Mutex<SessionLog>>,
    events: mpsc::UnboundedSender<Event>,
) {
    while let Some(task) = rx.recv().await {
        // Staleness skip, best effort: an interim result nobody will see
        // before the next one lands is not worth an inference.
        if task.is_partial() && rx.backlog() > 0 {
            tracing::trace!(segment_id = task.segment_id, "skipping stale partial");
            rx.task_done();
            continue;
        }

        let engine = Arc::clone(&transcriber);
        let samples = task.samples.clone();
        let outcome =
            tokio::task::spawn_blocking(move || transcribe_filtered(engine.as_ref(), &samples))
                .await;

        match outcome {
            Ok(Ok(text)) if text.is_empty() => {}
            Ok(Ok(text)) => {
                if task.is_partial() {
                    let _ = events.send(Event::TranscriptPartial {
                        text,
                        segment_id: task.segment_id,
                    });
                } else {
                    let entry = TranscriptEntry::now(task.segment_id, text);
                    let title = {
                        let mut log = session.lock().unwrap_or_else(|e| e.into_inner());
                        log.add_final(entry.clone())
                    };
                    let _ = events.send(Event::TranscriptFinal {
                        text: entry.text,
                        speaker: entry.speaker,
                        timestamp: entry.timestamp,
                        segment_id: entry.segment_id,
                    });
                    if let Some(title) = title {
                        let _ = events.send(Event::TitleUpdate { title });
                    }
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(segment_id = task.segment_id, error = %e, "transcription failed");
                let _ = events.send(Event::error(e));
            }
            Err(e) => {
                tracing::error!(error = %e, "transcription task panicked");
                let _ = events.send(Event::error("transcription task failed"));
            }
        }

        rx.task_done();
    }
}
