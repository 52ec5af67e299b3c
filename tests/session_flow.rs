//! End-to-end session flow against the public API, with a mock engine:
//! start a session, stream speech and silence frames, stop, and check the
//! emitted events and the artifacts on disk.

use std::sync::Arc;

use tokio::sync::mpsc;

use meetscribe::audio::{EnergyVad, encode_samples};
use meetscribe::defaults;
use meetscribe::segment::SegmenterConfig;
use meetscribe::server::{Event, SessionHost};
use meetscribe::storage::{SessionWriter, TranscriptFile};
use meetscribe::stt::MockTranscriber;

fn speech_frame() -> Vec<u8> {
    encode_samples(&vec![3000i16; defaults::FRAME_SAMPLES])
}

fn silence_frame() -> Vec<u8> {
    encode_samples(&vec![0i16; defaults::FRAME_SAMPLES])
}

fn new_host(
    transcriber: MockTranscriber,
    base_dir: &std::path::Path,
) -> (SessionHost, mpsc::UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let host = SessionHost::new(
        Arc::new(transcriber),
        Arc::new(EnergyVad::default()),
        SegmenterConfig::default(),
        SessionWriter::new(base_dir),
        tx,
    );
    (host, rx)
}

fn collect(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn one_utterance_session_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let (mut host, mut rx) = new_host(
        MockTranscriber::new("mock").with_response("hola equipo, empecemos la reunión"),
        dir.path(),
    );

    host.handle_control(r#"{"type":"session.start"}"#).await;

    // Two seconds of speech followed by enough silence to close the
    // utterance through the hangover.
    for _ in 0..100 {
        host.handle_frame(&speech_frame());
    }
    for _ in 0..40 {
        host.handle_frame(&silence_frame());
    }

    host.handle_control(r#"{"type":"session.stop"}"#).await;
    let events = collect(&mut rx);
    host.shutdown().await;

    assert!(matches!(events.first(), Some(Event::SessionReady)));

    let finals: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            Event::TranscriptFinal {
                text, segment_id, ..
            } => Some((text.clone(), *segment_id)),
            _ => None,
        })
        .collect();
    assert_eq!(finals.len(), 1);
    assert_eq!(finals[0].0, "hola equipo, empecemos la reunión");
    assert_eq!(finals[0].1, 0);

    assert!(
        events
            .iter()
            .any(|e| matches!(e, Event::TitleUpdate { title } if title == "hola equipo, empecemos la reunión"))
    );

    // The saved event points at real files.
    let (session_dir, audio_path, transcript_path) = events
        .iter()
        .find_map(|e| match e {
            Event::SessionSaved {
                session_dir,
                audio_path,
                transcript_path,
            } => Some((
                session_dir.clone(),
                audio_path.clone(),
                transcript_path.clone(),
            )),
            _ => None,
        })
        .expect("session.saved missing");
    assert!(std::path::Path::new(&session_dir).starts_with(dir.path()));

    // WAV holds every accepted frame: 140 frames of 320 samples.
    let reader = hound::WavReader::open(&audio_path).unwrap();
    assert_eq!(reader.spec().sample_rate, 16000);
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.len() as usize, 140 * defaults::FRAME_SAMPLES);

    let parsed: TranscriptFile =
        serde_json::from_str(&std::fs::read_to_string(&transcript_path).unwrap()).unwrap();
    assert_eq!(parsed.meeting_title, "hola equipo, empecemos la reunión");
    assert_eq!(parsed.sample_rate, 16000);
    assert_eq!(parsed.transcript.len(), 1);
    assert_eq!(parsed.transcript[0].segment_id, 0);
    assert_eq!(parsed.transcript[0].speaker, "Locutor");
    assert_eq!(parsed.transcript[0].text, "hola equipo, empecemos la reunión");
}

#[tokio::test]
async fn silence_only_session_saves_empty_transcript() {
    let dir = tempfile::tempdir().unwrap();
    let (mut host, mut rx) = new_host(MockTranscriber::new("mock"), dir.path());

    host.handle_control(r#"{"type":"session.start"}"#).await;
    for _ in 0..100 {
        host.handle_frame(&silence_frame());
    }
    host.handle_control(r#"{"type":"session.stop"}"#).await;
    let events = collect(&mut rx);
    host.shutdown().await;

    assert!(
        !events
            .iter()
            .any(|e| matches!(e, Event::TranscriptFinal { .. }))
    );
    let transcript_path = events
        .iter()
        .find_map(|e| match e {
            Event::SessionSaved {
                transcript_path, ..
            } => Some(transcript_path.clone()),
            _ => None,
        })
        .expect("session.saved missing");

    let parsed: TranscriptFile =
        serde_json::from_str(&std::fs::read_to_string(&transcript_path).unwrap()).unwrap();
    assert!(parsed.transcript.is_empty());
    assert_eq!(parsed.meeting_title, "");
}

#[tokio::test]
async fn long_monologue_yields_multiple_finals_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let (mut host, mut rx) = new_host(
        MockTranscriber::new("mock").with_response("sigo hablando sin parar"),
        dir.path(),
    );

    host.handle_control(r#"{"type":"session.start"}"#).await;

    // 20 seconds of uninterrupted speech; the 8s cap forces finals.
    for _ in 0..1000 {
        host.handle_frame(&speech_frame());
    }
    host.handle_control(r#"{"type":"session.stop"}"#).await;
    let events = collect(&mut rx);
    host.shutdown().await;

    let final_ids: Vec<u64> = events
        .iter()
        .filter_map(|e| match e {
            Event::TranscriptFinal { segment_id, .. } => Some(*segment_id),
            _ => None,
        })
        .collect();
    assert!(final_ids.len() >= 2, "expected forced finals, got {final_ids:?}");
    for pair in final_ids.windows(2) {
        assert!(pair[0] < pair[1], "final ids not increasing: {final_ids:?}");
    }
}
