use uuid::Uuid;

use super::state::{SessionState, StateDelta, Turn};
use crate::skills::{classify_intent, match_skill, IntentClass, SkillKind};

#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    Log(String),
    /// Build a prompt from knowledge + `history` and ask the model.
    RequestCompletion {
        request_id: Uuid,
        user_text: String,
        history: Vec<String>,
        class: IntentClass,
    },
    CancelCompletion(Uuid),
    RunSkill {
        skill: SkillKind,
        text: String,
        last_response: String,
    },
    Speak(String),
    StopAudio,
}

pub struct Scheduler;

impl Scheduler {
    /// Pure projection: dispatchable text + session -> (deltas, effects).
    /// Skills win over the model; the first matching trigger decides.
    pub fn route(&self, text: &str, state: &SessionState) -> (Vec<StateDelta>, Vec<SideEffect>) {
        let text = text.trim();
        if text.is_empty() {
            return (Vec::new(), Vec::new());
        }

        if let Some(hit) = match_skill(text) {
            let deltas = vec![StateDelta::TurnRecorded(Turn::user(text))];
            let effects = vec![SideEffect::RunSkill {
                skill: hit.kind,
                text: text.to_string(),
                last_response: state.last_response().to_string(),
            }];
            return (deltas, effects);
        }

        let mut effects = Vec::new();
        if let Some(previous) = state.pending_request() {
            // Newer input supersedes the thought in flight
            effects.push(SideEffect::CancelCompletion(previous));
        }

        let (class, priority) = classify_intent(text);
        let request_id = Uuid::new_v4();
        effects.push(SideEffect::Log(format!(
            "Completion {} requested ({:?}, priority {})",
            request_id, class, priority
        )));
        effects.push(SideEffect::RequestCompletion {
            request_id,
            user_text: text.to_string(),
            history: state.history_lines(),
            class,
        });

        let deltas = vec![
            StateDelta::TurnRecorded(Turn::user(text)),
            StateDelta::CompletionRequested(request_id),
        ];
        (deltas, effects)
    }
}
