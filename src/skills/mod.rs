//! Keyword-triggered skills.
//!
//! Matching is pure and lives here so the reactor can route input without
//! touching the filesystem. Execution lives in [`handlers`].

pub mod handlers;
pub mod system;

pub use handlers::SkillExecutor;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    TelemetryPulse,
    FileHeartbeat,
    WebSearch,
    Scribe,
    Archive,
    ManageProjects,
    MemoryRecall,
}

/// Ordered trigger table. The first trigger contained in the input wins.
pub const TRIGGERS: &[(&str, SkillKind)] = &[
    ("system vitals", SkillKind::TelemetryPulse),
    ("cpu load", SkillKind::TelemetryPulse),
    ("file heartbeat", SkillKind::FileHeartbeat),
    ("search for", SkillKind::WebSearch),
    ("look up", SkillKind::WebSearch),
    ("note down", SkillKind::Scribe),
    ("remember that", SkillKind::Scribe),
    ("scribe", SkillKind::Scribe),
    ("archive this", SkillKind::Archive),
    ("update project", SkillKind::ManageProjects),
    ("project milestone", SkillKind::ManageProjects),
    ("new project", SkillKind::ManageProjects),
    ("search memory", SkillKind::MemoryRecall),
    ("what did i say about", SkillKind::MemoryRecall),
    ("recall note", SkillKind::MemoryRecall),
];

const TECH_KEYWORDS: &[&str] = &[".py", "fix", "code", "logic", "milestone", "luma-", "error"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillMatch {
    pub kind: SkillKind,
    pub trigger: &'static str,
}

pub fn match_skill(text: &str) -> Option<SkillMatch> {
    let lowered = text.to_lowercase();
    TRIGGERS
        .iter()
        .find(|(trigger, _)| lowered.contains(trigger))
        .map(|&(trigger, kind)| SkillMatch { kind, trigger })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentClass {
    /// Engineering focus.
    Core,
    /// Daily chatter.
    Secondary,
}

/// Triage: returns the class and its priority.
pub fn classify_intent(text: &str) -> (IntentClass, u32) {
    let lowered = text.to_lowercase();
    if TECH_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        (IntentClass::Core, 200)
    } else {
        (IntentClass::Secondary, 80)
    }
}

/// Removes every occurrence of `triggers` from the lowercased text.
pub(crate) fn strip_triggers(text: &str, triggers: &[&str]) -> String {
    let mut out = text.to_lowercase();
    for &trigger in triggers {
        out = out.replace(trigger, "");
    }
    out.trim().to_string()
}
