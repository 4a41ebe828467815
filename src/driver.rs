use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::LumaConfig;
use crate::kernel::event::Event;
use crate::kernel::scheduler::SideEffect;
use crate::kernel::state::SessionState;
use crate::memory::KnowledgeStore;
use crate::services::llm::{LLMService, PromptBuilder};
use crate::services::voice::{VoiceFlags, VoiceOutput};
use crate::skills::system::HostSystem;
use crate::skills::{IntentClass, SkillExecutor, SkillKind};

/// Executes reactor side effects. Never touches session state; results come
/// back to the reactor as events.
pub struct Driver {
    runtime: Handle,
    events: mpsc::Sender<Event>,
    llm: LLMService,
    prompt: PromptBuilder,
    skills: SkillExecutor,
    voice: Option<VoiceOutput>,
    flags: Arc<VoiceFlags>,
    completions: HashMap<Uuid, JoinHandle<()>>,
    skill_tasks: Vec<JoinHandle<()>>,
}

impl Driver {
    pub fn new(
        runtime: Handle,
        events: mpsc::Sender<Event>,
        llm: LLMService,
        prompt: PromptBuilder,
        skills: SkillExecutor,
        flags: Arc<VoiceFlags>,
    ) -> Self {
        Self {
            runtime,
            events,
            llm,
            prompt,
            skills,
            voice: None,
            flags,
            completions: HashMap::new(),
            skill_tasks: Vec::new(),
        }
    }

    /// Wires the host services described by `cfg`. Speech output is only
    /// attached when voice is enabled.
    pub fn from_config(
        cfg: &LumaConfig,
        runtime: Handle,
        events: mpsc::Sender<Event>,
        flags: Arc<VoiceFlags>,
    ) -> Self {
        let store = KnowledgeStore::new(&cfg.knowledge_dir)
            .with_archive_step(std::time::Duration::from_millis(cfg.archive_step_ms));
        let skills = SkillExecutor::new(Arc::new(store), Arc::new(HostSystem), &cfg.user_name);
        let driver = Self::new(
            runtime.clone(),
            events.clone(),
            LLMService::new(&cfg.llm),
            PromptBuilder::new(&cfg.user_name, cfg.max_history),
            skills,
            flags.clone(),
        );
        if cfg.voice.enabled {
            driver.with_voice(VoiceOutput::new(&cfg.voice, flags, events, runtime))
        } else {
            driver
        }
    }

    pub fn with_voice(mut self, voice: VoiceOutput) -> Self {
        self.voice = Some(voice);
        self
    }

    pub fn skills(&self) -> &SkillExecutor {
        &self.skills
    }

    /// Mirrors the thinking flag so the listener stays muted while a
    /// completion is in flight.
    pub fn sync(&mut self, state: &SessionState) {
        self.flags.thinking.store(state.thinking, Ordering::Release);
        self.completions.retain(|_, task| !task.is_finished());
        self.skill_tasks.retain(|task| !task.is_finished());
    }

    /// Completions and skills still running as of the last `sync`.
    pub fn in_flight(&self) -> usize {
        self.completions.len() + self.skill_tasks.len()
    }

    pub fn execute(&mut self, effect: SideEffect) {
        match effect {
            SideEffect::Log(msg) => info!("{}", msg),
            SideEffect::RequestCompletion {
                request_id,
                user_text,
                history,
                class,
            } => self.request_completion(request_id, user_text, history, class),
            SideEffect::CancelCompletion(request_id) => {
                if let Some(task) = self.completions.remove(&request_id) {
                    task.abort();
                    info!("Completion {} aborted", request_id);
                }
            }
            SideEffect::RunSkill {
                skill,
                text,
                last_response,
            } => self.run_skill(skill, text, last_response),
            SideEffect::Speak(text) => match &self.voice {
                Some(voice) => voice.speak(text),
                None => info!("Luma: {}", text),
            },
            SideEffect::StopAudio => {
                if let Some(voice) = &self.voice {
                    voice.stop();
                }
            }
        }
    }

    fn request_completion(&mut self, request_id: Uuid, user_text: String, history: Vec<String>, class: IntentClass) {
        let llm = self.llm.clone();
        let prompt = self.prompt.clone();
        let store = self.skills.store().clone();
        let events = self.events.clone();

        let task = self.runtime.spawn(async move {
            let context = match tokio::task::spawn_blocking(move || store.load_context()).await {
                Ok(ctx) => ctx,
                Err(e) => {
                    warn!("Knowledge load failed: {}", e);
                    Default::default()
                }
            };
            let prompt = prompt.build(&context, &history, &user_text, class);

            // Hard cap on top of the client timeout
            let result = tokio::time::timeout(llm.timeout(), llm.complete(&prompt)).await;
            let event = match result {
                Ok(Ok(text)) => Event::CompletionReady { request_id, text },
                Ok(Err(e)) => {
                    warn!("LLM Error: {}", e);
                    // The client deadline and the hard cap are equal; report both the same way
                    let timed_out = e.downcast_ref::<reqwest::Error>().map_or(false, |e| e.is_timeout());
                    Event::CompletionFailed {
                        request_id,
                        reason: if timed_out { "timeout".to_string() } else { e.to_string() },
                    }
                }
                Err(_) => {
                    warn!("LLM Timeout");
                    Event::CompletionFailed {
                        request_id,
                        reason: "timeout".to_string(),
                    }
                }
            };
            if events.send(event).await.is_err() {
                warn!("Reactor gone, dropping completion {}", request_id);
            }
        });
        self.completions.insert(request_id, task);
    }

    fn run_skill(&mut self, skill: SkillKind, text: String, last_response: String) {
        let skills = self.skills.clone();
        let events = self.events.clone();
        let task = self.runtime.spawn(async move {
            let reply = tokio::task::spawn_blocking(move || skills.execute(skill, &text, &last_response)).await;
            match reply {
                Ok(reply) => {
                    let _ = events.send(Event::SkillCompleted { skill, reply }).await;
                }
                Err(e) => warn!("Skill {:?} panicked: {}", skill, e),
            }
        });
        self.skill_tasks.push(task);
    }
}
