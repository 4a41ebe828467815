use luma::config::LumaConfig;
use luma::kernel::event::{Event, InputEvent, SOURCE_BOT, SOURCE_CHAT, SOURCE_KEYBOARD};
use luma::kernel::reactor::Reactor;
use luma::kernel::telemetry::event::{CompletionEventKind, InputSourceKind, SpeechEventKind, TelemetryEvent};
use luma::kernel::telemetry::recorder::TelemetryRecorder;
use luma::skills::SkillKind;
use tokio::sync::mpsc;

#[tokio::test]
async fn test_completion_latency_average() {
    let mut recorder = TelemetryRecorder::new();
    for latency in [4, 8] {
        recorder.record(TelemetryEvent::Completion {
            event: CompletionEventKind::Requested,
            latency_ticks: 0,
        });
        recorder.record(TelemetryEvent::Completion {
            event: CompletionEventKind::Completed,
            latency_ticks: latency,
        });
    }
    recorder.record(TelemetryEvent::Completion {
        event: CompletionEventKind::Failed,
        latency_ticks: 30,
    });

    let snap = recorder.snapshot();
    assert_eq!(snap.completion_stats.requested, 2);
    assert_eq!(snap.completion_stats.completed, 2);
    assert_eq!(snap.completion_stats.failed, 1);
    // Failures do not count toward latency
    assert_eq!(snap.completion_stats.avg_latency_ticks, 6.0);
}

#[tokio::test]
async fn test_buffer_is_bounded() {
    let mut recorder = TelemetryRecorder::new();
    for _ in 0..10_050 {
        recorder.record(TelemetryEvent::Input {
            source: InputSourceKind::Chat,
        });
    }
    assert_eq!(recorder.len(), 10_000);
    assert_eq!(recorder.snapshot().input_stats.total, 10_000);

    // The roll-up still covers the whole session
    match recorder.aggregate_session(500) {
        TelemetryEvent::SessionSummary { inputs, .. } => assert_eq!(inputs, 10_050),
        other => panic!("unexpected summary {:?}", other),
    }

    recorder.clear();
    assert!(recorder.is_empty());
    assert_eq!(recorder.totals().inputs, 10_050);
}

#[tokio::test]
async fn test_session_summary_rollup() {
    let mut recorder = TelemetryRecorder::new();
    recorder.record(TelemetryEvent::Input {
        source: InputSourceKind::Voice,
    });
    recorder.record(TelemetryEvent::SkillInvoked { skill: SkillKind::Scribe });
    recorder.record(TelemetryEvent::SkillInvoked { skill: SkillKind::MemoryRecall });
    recorder.record(TelemetryEvent::Speech {
        event: SpeechEventKind::Started { cached: false },
    });
    recorder.record(TelemetryEvent::Speech {
        event: SpeechEventKind::Stopped,
    });

    match recorder.aggregate_session(120) {
        TelemetryEvent::SessionSummary {
            duration_ticks,
            inputs,
            skills,
            utterances,
            ..
        } => {
            assert_eq!(duration_ticks, 120);
            assert_eq!(inputs, 1);
            assert_eq!(skills, 2);
            assert_eq!(utterances, 1);
        }
        other => panic!("unexpected summary {:?}", other),
    }
    assert_eq!(recorder.snapshot().speech_stats.stops, 1);
}

#[tokio::test]
async fn test_inputs_counted_by_source() {
    let (_tx, rx) = mpsc::channel::<Event>(10);
    let mut reactor = Reactor::new(rx, &LumaConfig::default(), 0.0);

    reactor.tick_step(
        vec![
            InputEvent::signal(SOURCE_BOT, "127.0.0.1: ping").into(),
            InputEvent::signal(SOURCE_KEYBOARD, "SPACE (simulated input)").into(),
            InputEvent::text(SOURCE_CHAT, "note down tea").into(),
        ],
        1.0,
    );

    let snap = reactor.telemetry.snapshot();
    assert_eq!(snap.input_stats.total, 3);
    assert_eq!(snap.input_stats.by_source.get(&InputSourceKind::Bot), Some(&1));
    assert_eq!(snap.input_stats.by_source.get(&InputSourceKind::Keyboard), Some(&1));
    assert_eq!(snap.input_stats.by_source.get(&InputSourceKind::Chat), Some(&1));
}

#[tokio::test]
async fn test_serialized_events_hold_no_content() {
    let (_tx, rx) = mpsc::channel::<Event>(10);
    let mut reactor = Reactor::new(rx, &LumaConfig::default(), 0.0);

    reactor.tick_step(vec![InputEvent::text(SOURCE_CHAT, "remember that the door code is 4711").into()], 1.0);

    let json = serde_json::to_string(&reactor.telemetry.aggregate_session(1)).unwrap();
    assert!(!json.contains("4711"));
    assert!(json.contains("SessionSummary"));
}
