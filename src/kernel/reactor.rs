use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use super::cancel::CancellationRegistry;
use super::event::{AudioStatus, Event, InputContent, InputEvent};
use super::presence::{Presence, PresenceState};
use super::scheduler::{Scheduler, SideEffect};
use super::state::{SessionState, StateDelta, Turn};
use super::telemetry::event::{CompletionEventKind, InputSourceKind, SpeechEventKind, TelemetryEvent};
use super::telemetry::recorder::TelemetryRecorder;
use super::time::{Clock, Tick, TICK_MS};
use crate::config::LumaConfig;
use crate::skills::SkillKind;

#[derive(Debug, Clone)]
pub struct ReactorConfig {
    pub user_name: String,
    pub max_history: usize,
}

impl From<&LumaConfig> for ReactorConfig {
    fn from(cfg: &LumaConfig) -> Self {
        Self {
            user_name: cfg.user_name.clone(),
            max_history: cfg.max_history,
        }
    }
}

pub struct Reactor {
    pub receiver: mpsc::Receiver<Event>,
    pub state: SessionState,
    pub presence: Presence,
    pub scheduler: Scheduler,
    pub cancel_registry: CancellationRegistry,
    pub telemetry: TelemetryRecorder,
    pub tick: Tick,
    config: ReactorConfig,
    last_presence: PresenceState,
    request_started: Option<(Uuid, Tick)>,
}

impl Reactor {
    /// `now` anchors the breathing animation.
    pub fn new(receiver: mpsc::Receiver<Event>, cfg: &LumaConfig, now: f64) -> Self {
        let config = ReactorConfig::from(cfg);
        Self {
            receiver,
            state: SessionState::new(config.max_history),
            presence: Presence::new(cfg, now),
            scheduler: Scheduler,
            cancel_registry: CancellationRegistry::new(),
            telemetry: TelemetryRecorder::new(),
            tick: Tick::new(),
            config,
            last_presence: PresenceState::Idle,
            request_started: None,
        }
    }

    /// Non-blocking drain of everything queued since the last frame.
    pub fn drain(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    pub fn presence_state(&self, now: f64) -> PresenceState {
        PresenceState::resolve(self.presence.is_attentive(now), self.state.thinking, self.state.speaking)
    }

    fn apply(&mut self, deltas: Vec<StateDelta>) {
        for delta in deltas {
            self.state.reduce(delta);
        }
    }

    /// Pure tick step: advances state and returns side effects for the driver.
    /// MUST NOT await I/O or timers.
    pub fn tick_step(&mut self, events: Vec<Event>, now: f64) -> Vec<SideEffect> {
        self.tick = self.tick.next();
        self.state.reduce(StateDelta::Tick(self.tick));
        let mut effects = Vec::new();

        let mut inputs = Vec::new();
        let mut results = Vec::new();
        for event in events {
            match event {
                Event::Input(inp) => inputs.push(inp),
                other => results.push(other),
            }
        }

        // === 1. CANCEL ===
        if self.cancel_registry.process(&inputs) {
            if let Some(id) = self.state.pending_request() {
                effects.push(SideEffect::CancelCompletion(id));
                self.state.reduce(StateDelta::CompletionCanceled);
                self.request_started = None;
                self.record_completion(CompletionEventKind::Canceled, 0);
            }
            effects.push(SideEffect::StopAudio);
            self.state.reduce(StateDelta::SpeakingChanged(false));
            self.telemetry.record(TelemetryEvent::Speech { event: SpeechEventKind::Stopped });
        }

        // === 2. INPUTS ===
        for inp in inputs {
            self.handle_input(inp, now, &mut effects);
        }

        // === 3. ASYNC RESULTS ===
        for result in results {
            self.handle_result(result, &mut effects);
        }

        // === 4. PRESENCE ===
        let current = self.presence_state(now);
        if current != self.last_presence {
            self.telemetry.record(TelemetryEvent::PresenceTransition {
                from: self.last_presence,
                to: current,
                tick: self.tick,
            });
            self.last_presence = current;
        }

        effects
    }

    fn handle_input(&mut self, input: InputEvent, now: f64, effects: &mut Vec<SideEffect>) {
        let source = InputSourceKind::from_source(&input.source);
        match input.content {
            InputContent::Signal(text) => {
                self.telemetry.record(TelemetryEvent::Input { source });
                self.presence.receive_input(&text, now);
            }
            InputContent::Text(text) => {
                self.telemetry.record(TelemetryEvent::Input { source });
                self.presence.receive_input(&text, now);
                if CancellationRegistry::is_cancel(&text) {
                    return;
                }
                let (deltas, routed) = self.scheduler.route(&text, &self.state);
                for effect in &routed {
                    match effect {
                        SideEffect::RunSkill { skill, .. } => {
                            self.telemetry.record(TelemetryEvent::SkillInvoked { skill: *skill });
                        }
                        SideEffect::RequestCompletion { request_id, .. } => {
                            self.request_started = Some((*request_id, self.tick));
                            self.record_completion(CompletionEventKind::Requested, 0);
                        }
                        _ => {}
                    }
                }
                self.apply(deltas);
                effects.extend(routed);
            }
            InputContent::WakeWord => {
                self.telemetry.record(TelemetryEvent::Input { source });
                self.presence.receive_input("wake word", now);
                effects.push(SideEffect::Speak(format!("Ready and waiting, {}.", self.config.user_name)));
            }
            InputContent::AudioStatus(AudioStatus::PlaybackStarted { cached }) => {
                self.state.reduce(StateDelta::SpeakingChanged(true));
                self.telemetry.record(TelemetryEvent::Speech {
                    event: SpeechEventKind::Started { cached },
                });
            }
            InputContent::AudioStatus(AudioStatus::PlaybackEnded) => {
                self.state.reduce(StateDelta::SpeakingChanged(false));
                self.telemetry.record(TelemetryEvent::Speech { event: SpeechEventKind::Ended });
            }
        }
    }

    fn handle_result(&mut self, event: Event, effects: &mut Vec<SideEffect>) {
        match event {
            Event::CompletionReady { request_id, text } => {
                // STALE REJECTION: only the request in flight may answer
                if self.state.pending_request() != Some(request_id) {
                    info!("Discarded stale completion {}", request_id);
                    self.record_completion(CompletionEventKind::Stale, 0);
                    return;
                }
                let latency = self.settle(request_id);
                self.record_completion(CompletionEventKind::Completed, latency);
                self.apply(vec![
                    StateDelta::ResponseRecorded(text.clone()),
                    StateDelta::TurnRecorded(Turn::luma(&text)),
                ]);
                effects.push(SideEffect::Speak(text));
            }
            Event::CompletionFailed { request_id, reason } => {
                if self.state.pending_request() != Some(request_id) {
                    debug!("Ignoring failure of superseded completion {}", request_id);
                    return;
                }
                self.settle(request_id);
                self.record_completion(CompletionEventKind::Failed, 0);
                effects.push(SideEffect::Log(format!("Completion {} failed: {}", request_id, reason)));
                effects.push(SideEffect::Speak(format!(
                    "My link to the local model is down, {}.",
                    self.config.user_name
                )));
            }
            Event::SkillCompleted { skill, reply } => {
                self.finish_skill(skill, reply, effects);
            }
            Event::Input(_) => {}
        }
    }

    fn finish_skill(&mut self, skill: SkillKind, reply: String, effects: &mut Vec<SideEffect>) {
        debug!("Skill {:?} finished", skill);
        self.state.reduce(StateDelta::TurnRecorded(Turn::luma(&reply)));
        effects.push(SideEffect::Speak(reply));
    }

    /// Clears the request in flight and returns its latency in ticks.
    fn settle(&mut self, request_id: Uuid) -> u64 {
        self.state.reduce(StateDelta::CompletionSettled(request_id));
        match self.request_started.take() {
            Some((id, started)) if id == request_id => self.tick.frame.saturating_sub(started.frame),
            _ => 0,
        }
    }

    fn record_completion(&mut self, event: CompletionEventKind, latency_ticks: u64) {
        self.telemetry.record(TelemetryEvent::Completion { event, latency_ticks });
    }

    /// Headless loop. `on_tick` receives each tick's effects, possibly none.
    pub async fn run<F>(&mut self, clock: Clock, token: CancellationToken, mut on_tick: F)
    where
        F: FnMut(Vec<SideEffect>, &Reactor),
    {
        info!("Reactor loop started. Tick: {}ms", TICK_MS);

        let mut cadence = interval(Duration::from_millis(TICK_MS));
        cadence.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = cadence.tick() => {}
            }

            let events = self.drain();
            let effects = self.tick_step(events, clock.now());
            on_tick(effects, self);
        }

        info!("Reactor loop stopped after {} ticks", self.tick.frame);
    }
}
