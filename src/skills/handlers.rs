use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use super::system::SystemProbe;
use super::{strip_triggers, SkillKind};
use crate::memory::KnowledgeStore;

const SCRIBE_TRIGGERS: &[&str] = &["note down", "remember that", "scribe", "write", "note"];
const SEARCH_TRIGGERS: &[&str] = &["search for", "look up"];
const PROJECT_TRIGGERS: &[&str] = &["update project"];
// Longest first so "search memory for" is not left as "for".
const RECALL_TRIGGERS: &[&str] = &[
    "search memory for",
    "recall note about",
    "what did i say about",
    "search memory",
    "recall note",
];

const SEARCH_URL: &str = "https://www.google.com/search";

/// Runs skills against the knowledge store and the host system.
///
/// Every handler returns the sentence Luma speaks back. Failures are logged
/// and turned into an apologetic reply rather than propagated.
#[derive(Clone)]
pub struct SkillExecutor {
    store: Arc<KnowledgeStore>,
    probe: Arc<dyn SystemProbe>,
    user: String,
}

impl SkillExecutor {
    pub fn new(store: Arc<KnowledgeStore>, probe: Arc<dyn SystemProbe>, user: &str) -> Self {
        Self {
            store,
            probe,
            user: user.to_string(),
        }
    }

    pub fn store(&self) -> &Arc<KnowledgeStore> {
        &self.store
    }

    /// `last_response` is the most recent LLM answer, used by the archive skill.
    pub fn execute(&self, kind: SkillKind, text: &str, last_response: &str) -> String {
        info!("Skill {:?} triggered", kind);
        match kind {
            SkillKind::TelemetryPulse => self.telemetry_pulse(),
            SkillKind::FileHeartbeat => self.file_heartbeat(text),
            SkillKind::WebSearch => self.web_search(text),
            SkillKind::Scribe => self.contextual_scribe(text),
            SkillKind::Archive => self.archive_logic(last_response),
            SkillKind::ManageProjects => self.manage_projects(text),
            SkillKind::MemoryRecall => self.memory_recall(text),
        }
    }

    fn failed(&self, what: &str, err: impl std::fmt::Display) -> String {
        warn!("Skill failure while {}: {}", what, err);
        format!("Something went wrong while {}, {}.", what, self.user)
    }

    pub fn telemetry_pulse(&self) -> String {
        let cpu = self.probe.cpu_percent();
        format!("CPU is holding at {:.1} percent, Master {}.", cpu, self.user)
    }

    pub fn file_heartbeat(&self, text: &str) -> String {
        let target = text.split_whitespace().find(|w| w.contains('.'));
        if let Some(target) = target {
            if let Some(mtime) = self.probe.modified_at(Path::new(target)) {
                return format!(
                    "The heartbeat for {} was last seen at {}.",
                    target,
                    mtime.format("%H:%M")
                );
            }
        }
        "I can't find a file heartbeat for that specific target.".to_string()
    }

    pub fn web_search(&self, text: &str) -> String {
        let query = strip_triggers(text, SEARCH_TRIGGERS);
        let url = match reqwest::Url::parse_with_params(SEARCH_URL, &[("q", query.as_str())]) {
            Ok(u) => u,
            Err(e) => return self.failed("building the search uplink", e),
        };
        if let Err(e) = self.probe.open_url(url.as_str()) {
            return self.failed("opening the search uplink", e);
        }
        format!("Opening an uplink for '{}' now.", query)
    }

    pub fn contextual_scribe(&self, text: &str) -> String {
        let mut content = text.to_string();
        // Each trigger keeps only what follows its last occurrence
        for &trigger in SCRIBE_TRIGGERS {
            let lowered = content.to_lowercase();
            if lowered.contains(trigger) {
                content = lowered.rsplit(trigger).next().unwrap_or("").trim().to_string();
            }
        }
        match self.store.scribe_note(&content) {
            Ok(id) => format!("Thought indexed, {}. Scribe Entry {} is secured.", self.user, id),
            Err(e) => self.failed("scribing that thought", e),
        }
    }

    pub fn archive_logic(&self, last_response: &str) -> String {
        match self.store.archive_to_long_term("Manual Archive", last_response) {
            Ok(id) => format!("Logic promoted to archive. ID: {}.", id),
            Err(e) => self.failed("archiving", e),
        }
    }

    pub fn manage_projects(&self, text: &str) -> String {
        let details = strip_triggers(text, PROJECT_TRIGGERS);
        match self.store.write_project_update(&details) {
            Ok(id) => format!("Project telemetry updated, {}. Reference ID: {}.", self.user, id),
            Err(e) => self.failed("updating the project log", e),
        }
    }

    pub fn memory_recall(&self, text: &str) -> String {
        let query = strip_triggers(text, RECALL_TRIGGERS);
        match self.store.search_notes(&query).last() {
            Some(hit) => format!(
                "I've found a match in my archives: '{}'. Does that help, {}?",
                hit.content, self.user
            ),
            None => format!(
                "I've scanned the scribe logs, but I can't find anything related to '{}'.",
                query
            ),
        }
    }

    /// Indexes the last conversation line as the session focus.
    pub fn save_session_summary(&self, history: &[String]) -> String {
        let last = history.last().map(String::as_str).unwrap_or("No activity.");
        match self.store.write_session_summary(last) {
            Ok(_) => format!("Session highlights have been indexed, Master {}.", self.user),
            Err(e) => self.failed("saving the session", e),
        }
    }
}
