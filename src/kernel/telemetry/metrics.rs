use std::collections::{HashMap, VecDeque};

use super::event::{CompletionEventKind, InputSourceKind, SpeechEventKind, TelemetryEvent};
use crate::skills::SkillKind;

#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    pub input_stats: InputStats,
    pub skill_stats: HashMap<SkillKind, u64>,
    pub completion_stats: CompletionStats,
    pub speech_stats: SpeechStats,
    pub presence_transitions: u64,
}

#[derive(Debug, Clone, Default)]
pub struct InputStats {
    pub total: u64,
    pub by_source: HashMap<InputSourceKind, u64>,
}

#[derive(Debug, Clone, Default)]
pub struct CompletionStats {
    pub requested: u64,
    pub completed: u64,
    pub failed: u64,
    pub stale: u64,
    pub canceled: u64,
    pub total_latency_ticks: u64,
    pub avg_latency_ticks: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SpeechStats {
    pub utterances: u64,
    pub cache_hits: u64,
    pub stops: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    for event in events {
        match event {
            TelemetryEvent::PresenceTransition { .. } => snap.presence_transitions += 1,
            TelemetryEvent::Input { source } => {
                snap.input_stats.total += 1;
                *snap.input_stats.by_source.entry(*source).or_insert(0) += 1;
            }
            TelemetryEvent::SkillInvoked { skill } => {
                *snap.skill_stats.entry(*skill).or_insert(0) += 1;
            }
            TelemetryEvent::Completion { event, latency_ticks } => {
                let c = &mut snap.completion_stats;
                match event {
                    CompletionEventKind::Requested => c.requested += 1,
                    CompletionEventKind::Completed => {
                        c.completed += 1;
                        c.total_latency_ticks += latency_ticks;
                    }
                    CompletionEventKind::Failed => c.failed += 1,
                    CompletionEventKind::Stale => c.stale += 1,
                    CompletionEventKind::Canceled => c.canceled += 1,
                }
            }
            TelemetryEvent::Speech { event } => match event {
                SpeechEventKind::Started { cached } => {
                    snap.speech_stats.utterances += 1;
                    if *cached {
                        snap.speech_stats.cache_hits += 1;
                    }
                }
                SpeechEventKind::Stopped => snap.speech_stats.stops += 1,
                SpeechEventKind::Ended => {}
            },
            TelemetryEvent::SessionSummary { .. } => {}
        }
    }

    let c = &mut snap.completion_stats;
    if c.completed > 0 {
        c.avg_latency_ticks = c.total_latency_ticks as f64 / c.completed as f64;
    }

    snap
}
