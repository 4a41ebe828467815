use std::collections::VecDeque;
use super::event::{CompletionEventKind, SpeechEventKind, TelemetryEvent};
use super::metrics::{TelemetrySnapshot, compute_snapshot};

const MAX_EVENTS: usize = 10_000;

/// Whole-session counts, kept outside the ring buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionTotals {
    pub inputs: u64,
    pub skills: u64,
    pub completions: u64,
    pub failures: u64,
    pub utterances: u64,
}

impl SessionTotals {
    fn count(&mut self, event: &TelemetryEvent) {
        match event {
            TelemetryEvent::Input { .. } => self.inputs += 1,
            TelemetryEvent::SkillInvoked { .. } => self.skills += 1,
            TelemetryEvent::Completion { event: CompletionEventKind::Completed, .. } => self.completions += 1,
            TelemetryEvent::Completion { event: CompletionEventKind::Failed, .. } => self.failures += 1,
            TelemetryEvent::Speech { event: SpeechEventKind::Started { .. } } => self.utterances += 1,
            _ => {}
        }
    }
}

/// Recent events for snapshots, bounded to `MAX_EVENTS`, plus running totals
/// for the shutdown roll-up.
#[derive(Debug)]
pub struct TelemetryRecorder {
    buffer: VecDeque<TelemetryEvent>,
    totals: SessionTotals,
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(256),
            totals: SessionTotals::default(),
        }
    }

    pub fn record(&mut self, event: TelemetryEvent) {
        self.totals.count(&event);
        if self.buffer.len() >= MAX_EVENTS {
            self.buffer.pop_front();
        }
        self.buffer.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        compute_snapshot(&self.buffer)
    }

    pub fn totals(&self) -> SessionTotals {
        self.totals
    }

    /// Drops buffered events. Session totals are kept.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Rolled up at shutdown from the running totals.
    pub fn aggregate_session(&self, duration_ticks: u64) -> TelemetryEvent {
        let t = self.totals;
        TelemetryEvent::SessionSummary {
            duration_ticks,
            inputs: t.inputs,
            skills: t.skills,
            completions: t.completions,
            failures: t.failures,
            utterances: t.utterances,
        }
    }
}
