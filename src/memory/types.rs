use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One line in `scribe_log.json`. Hand-written entries may lack fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScribeEntry {
    pub id: u64,
    pub timestamp: String,
    pub content: String,
}

/// One milestone in `projects.json`. IDs look like `PRJ-101`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEntry {
    pub id: String,
    pub timestamp: String,
    pub details: String,
}

/// Promoted logic. IDs look like `SOL_261018_1432`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchivedSolution {
    pub id: String,
    pub title: String,
    pub content: String,
    pub timestamp: String,
}

/// `long_term_memory.json`. Keys other than `archived_solutions` are carried
/// through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LongTermMemory {
    #[serde(default)]
    pub archived_solutions: Vec<ArchivedSolution>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// `session.json`, overwritten at the end of each session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub timestamp: String,
    pub last_focus: String,
}

/// Everything the prompt builder reads from disk, loaded in one pass.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeContext {
    pub persona: Option<String>,
    pub guardrails: Option<String>,
    pub profile: Map<String, Value>,
    pub solutions: Vec<ArchivedSolution>,
    pub projects: Vec<ProjectEntry>,
}

/// What the store is doing right now, for the HUD.
#[derive(Debug, Clone, PartialEq)]
pub struct OpsStatus {
    pub active: bool,
    pub progress: f32,
    pub current_op: String,
}

impl Default for OpsStatus {
    fn default() -> Self {
        Self {
            active: false,
            progress: 0.0,
            current_op: "IDLE".to_string(),
        }
    }
}
