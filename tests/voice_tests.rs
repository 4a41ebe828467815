mod common;

use common::serve_once;
use luma::audio::processing::{frame_size, UtteranceSegmenter};
use luma::audio::wav::{decode_wav, encode_wav, resample, STT_SAMPLE_RATE};
use luma::services::voice::stt::HttpTranscriber;
use luma::services::voice::tts::HttpSynthesizer;
use luma::services::voice::{VoiceCache, VoiceError, VoiceFlags, WakeAction, WakeGate};
use std::io::Cursor;
use std::sync::atomic::Ordering;
use tempfile::tempdir;

#[tokio::test]
async fn test_cache_key_normalizes_text() {
    let a = VoiceCache::key("Hello, Lau.");
    let b = VoiceCache::key("  hello, lau.  ");
    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
    assert_ne!(a, VoiceCache::key("Hello, Lau!"));
}

#[tokio::test]
async fn test_cache_lookup_after_store() {
    let dir = tempdir().unwrap();
    let cache = VoiceCache::new(dir.path().join("voice_cache"));

    assert!(cache.lookup("Ready and waiting.").is_none());
    let path = cache.store("Ready and waiting.", b"RIFF").unwrap();

    assert_eq!(cache.lookup("ready and waiting."), Some(path.clone()));
    assert!(path.to_string_lossy().ends_with(".wav"));
}

#[tokio::test]
async fn test_wake_gate_inline_command() {
    let mut gate = WakeGate::new("luma", 8.0);
    assert_eq!(gate.feed("Luma, note down buy milk", 0.0), WakeAction::Command("note down buy milk".to_string()));
    assert!(!gate.is_armed(0.0));
    assert_eq!(gate.feed("note down buy milk", 1.0), WakeAction::Ignore);
}

#[tokio::test]
async fn test_wake_gate_window() {
    let mut gate = WakeGate::new("luma", 8.0);

    assert_eq!(gate.feed("hey luma", 10.0), WakeAction::Acknowledge);
    assert!(gate.is_armed(17.0));
    assert_eq!(gate.feed("system vitals", 12.0), WakeAction::Command("system vitals".to_string()));

    // Window consumed
    assert_eq!(gate.feed("system vitals", 13.0), WakeAction::Ignore);

    // Window expired
    assert_eq!(gate.feed("luma", 20.0), WakeAction::Acknowledge);
    assert_eq!(gate.feed("what time is it", 29.0), WakeAction::Ignore);
    assert_eq!(gate.feed("", 30.0), WakeAction::Ignore);
}

#[tokio::test]
async fn test_segmenter_needs_sustained_speech() {
    let size = frame_size(16_000);
    assert_eq!(size, 480);
    let frame = vec![0.1f32; size];
    let mut seg = UtteranceSegmenter::new(3.0);

    // Two-frame blip never opens an utterance
    assert!(seg.push_frame(&frame, true).is_none());
    assert!(seg.push_frame(&frame, true).is_none());
    for _ in 0..30 {
        assert!(seg.push_frame(&frame, false).is_none());
    }
    assert!(!seg.is_speaking());

    // Three speech frames open, twenty silent frames close
    for _ in 0..3 {
        assert!(seg.push_frame(&frame, true).is_none());
    }
    assert!(seg.is_speaking());
    let mut out = None;
    for _ in 0..20 {
        out = seg.push_frame(&frame, false);
    }
    let utterance = out.expect("utterance closed by silence");
    assert_eq!(utterance.len(), 23 * size);
    assert!(!seg.is_speaking());
}

#[tokio::test]
async fn test_segmenter_phrase_limit() {
    let frame = vec![0.2f32; frame_size(16_000)];
    let mut seg = UtteranceSegmenter::new(0.3);

    let mut closed = None;
    for i in 0..50 {
        if let Some(u) = seg.push_frame(&frame, true) {
            closed = Some((i, u));
            break;
        }
    }
    let (at, utterance) = closed.expect("phrase limit closes the utterance");
    assert_eq!(at, 9);
    assert_eq!(utterance.len(), 10 * frame.len());
}

#[tokio::test]
async fn test_wav_encoding_for_stt() {
    let tone: Vec<f32> = (0..16_000).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();

    let bytes = encode_wav(&tone, STT_SAMPLE_RATE).unwrap();
    assert_eq!(&bytes[..4], b"RIFF");

    let (decoded, rate) = decode_wav(Cursor::new(bytes)).unwrap();
    assert_eq!(rate, STT_SAMPLE_RATE);
    assert_eq!(decoded.len(), tone.len());
    assert!((decoded[100] - tone[100]).abs() < 1e-3);
}

#[tokio::test]
async fn test_resample_changes_length_by_ratio() {
    let input = vec![0.0f32; 48_000];
    let out = resample(&input, 48_000, 16_000).unwrap();
    // Padding from the flush may add up to a chunk or two
    assert!(out.len() >= 15_000 && out.len() <= 17_500, "got {}", out.len());

    let same = resample(&input[..100], 16_000, 16_000).unwrap();
    assert_eq!(same.len(), 100);
}

#[tokio::test]
async fn test_transcriber_lowercases() {
    let (addr, server) = serve_once("200 OK", "application/json", br#"{"text":"  Luma, System Vitals "}"#.to_vec()).await;
    let stt = HttpTranscriber::new(&format!("http://{}/inference", addr));

    let text = stt.transcribe(b"RIFFfake".to_vec()).await.unwrap();
    assert_eq!(text, "luma, system vitals");

    let captured = server.await.unwrap();
    assert!(captured.head.to_ascii_lowercase().contains("content-type: audio/wav"));
    assert_eq!(captured.body, b"RIFFfake");
}

#[tokio::test]
async fn test_synthesizer_rejects_empty_audio() {
    let (addr, server) = serve_once("200 OK", "audio/wav", Vec::new()).await;
    let tts = HttpSynthesizer::new(&format!("http://{}/tts_to_audio", addr), "voice.wav", "en");

    assert!(matches!(tts.synthesize("hello").await, Err(VoiceError::EmptyAudio)));
    server.await.unwrap();
}

#[tokio::test]
async fn test_busy_flags() {
    let flags = VoiceFlags::default();
    assert!(!flags.busy());
    flags.thinking.store(true, Ordering::Release);
    assert!(flags.busy());
    flags.thinking.store(false, Ordering::Release);
    flags.speaking.store(true, Ordering::Release);
    assert!(flags.busy());
}
