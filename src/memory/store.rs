use crate::memory::types::{
    ArchivedSolution, KnowledgeContext, LongTermMemory, OpsStatus, ProjectEntry, ScribeEntry,
    SessionSummary,
};
use chrono::Local;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const PERSONA_FILE: &str = "persona.md";
pub const GUARDRAILS_FILE: &str = "guardrails.md";
pub const PROFILE_FILE: &str = "user_profile.json";
pub const LONG_TERM_FILE: &str = "long_term_memory.json";
pub const PROJECTS_FILE: &str = "projects.json";
pub const SCRIBE_FILE: &str = "scribe_log.json";
pub const SESSION_FILE: &str = "session.json";

const ARCHIVE_STEPS: u32 = 10;

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("knowledge I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("knowledge serialization: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The file exists but cannot be parsed; it is left as is.
    #[error("{path} is not valid JSON, refusing to overwrite: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path} does not hold a JSON {expected}, refusing to overwrite")]
    Shape { path: PathBuf, expected: &'static str },
}

fn iso_now() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Small JSON/Markdown files acting as Luma's persisted memory.
///
/// Nothing is cached: every operation reads the file it needs, so edits made
/// by hand while Luma is running are picked up.
///
/// Writers hold `write_lock` from load to save and replace files by rename,
/// so concurrent skills never lose entries and readers never see a partial
/// file. Entries are appended as raw JSON, keeping whatever shape older
/// entries have.
#[derive(Debug)]
pub struct KnowledgeStore {
    dir: PathBuf,
    archive_step: Duration,
    status: Arc<Mutex<OpsStatus>>,
    write_lock: Mutex<()>,
}

/// Marks the store busy for the lifetime of one operation.
struct OpGuard<'a> {
    status: &'a Mutex<OpsStatus>,
}

impl<'a> OpGuard<'a> {
    fn begin(status: &'a Mutex<OpsStatus>, op: &str) -> Self {
        if let Ok(mut s) = status.lock() {
            s.active = true;
            s.progress = 0.0;
            s.current_op = op.to_string();
        }
        Self { status }
    }

    fn progress(&self, progress: f32) {
        if let Ok(mut s) = self.status.lock() {
            s.progress = progress;
        }
    }
}

impl Drop for OpGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut s) = self.status.lock() {
            *s = OpsStatus::default();
        }
    }
}

impl KnowledgeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            archive_step: Duration::from_millis(400),
            status: Arc::new(Mutex::new(OpsStatus::default())),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_archive_step(mut self, step: Duration) -> Self {
        self.archive_step = step;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Shared handle so the UI can poll progress while a skill runs.
    pub fn status_handle(&self) -> Arc<Mutex<OpsStatus>> {
        self.status.clone()
    }

    pub fn status(&self) -> OpsStatus {
        self.status.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Loads JSON with a safety net: missing, empty or corrupt files yield
    /// the default value.
    pub fn load_json<T>(&self, filename: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        let path = self.path(filename);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return T::default(),
        };
        let content = content.trim();
        if content.is_empty() {
            return T::default();
        }
        match serde_json::from_str(content) {
            Ok(v) => v,
            Err(e) => {
                warn!("{} was corrupted or empty ({}). Resetting.", filename, e);
                T::default()
            }
        }
    }

    /// List entries that deserialize as `T`. Entries of another shape are
    /// skipped for reading but stay in the file.
    pub fn load_entries<T: DeserializeOwned>(&self, filename: &str) -> Vec<T> {
        self.load_json::<Vec<Value>>(filename)
            .into_iter()
            .filter_map(|v| match serde_json::from_value(v) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping unreadable entry in {}: {}", filename, e);
                    None
                }
            })
            .collect()
    }

    /// Strict load for read-modify-write. Missing or blank files are empty;
    /// anything unparsable is an error so the caller never overwrites it.
    fn load_for_update(&self, filename: &str) -> Result<Option<Value>, KnowledgeError> {
        let path = self.path(filename);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(KnowledgeError::Io { path, source }),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&content).map(Some).map_err(|source| {
            warn!("{} is unreadable, leaving it untouched: {}", filename, source);
            KnowledgeError::Corrupt { path, source }
        })
    }

    fn load_list_for_update(&self, filename: &str) -> Result<Vec<Value>, KnowledgeError> {
        match self.load_for_update(filename)? {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(KnowledgeError::Shape {
                path: self.path(filename),
                expected: "array",
            }),
        }
    }

    /// Writes pretty JSON, creating the knowledge directory if needed.
    /// The file is replaced atomically.
    pub fn save_json<T: Serialize>(&self, filename: &str, data: &T) -> Result<(), KnowledgeError> {
        if !self.dir.exists() {
            info!("Creating missing knowledge directory: {}", self.dir.display());
            fs::create_dir_all(&self.dir).map_err(|source| KnowledgeError::Io {
                path: self.dir.clone(),
                source,
            })?;
        }
        let path = self.path(filename);
        let tmp = self.path(&format!(".{}.tmp", filename));
        let json = serde_json::to_string_pretty(data)?;
        fs::write(&tmp, json).map_err(|source| KnowledgeError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| KnowledgeError::Io { path, source })
    }

    fn lock_writes(&self) -> std::sync::MutexGuard<'_, ()> {
        // Writes go through rename, so a poisoned lock guards no partial file
        self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Free text file, `None` when missing or blank.
    pub fn load_text(&self, filename: &str) -> Option<String> {
        let text = fs::read_to_string(self.path(filename)).ok()?;
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    pub fn load_context(&self) -> KnowledgeContext {
        let memory: LongTermMemory = self.load_json(LONG_TERM_FILE);
        KnowledgeContext {
            persona: self.load_text(PERSONA_FILE),
            guardrails: self.load_text(GUARDRAILS_FILE),
            profile: self.load_json::<Map<String, Value>>(PROFILE_FILE),
            solutions: memory.archived_solutions,
            projects: self.load_entries(PROJECTS_FILE),
        }
    }

    /// Appends a thought to the scribe log and returns its ID.
    pub fn scribe_note(&self, content: &str) -> Result<u64, KnowledgeError> {
        let _op = OpGuard::begin(&self.status, "SCRIBING THOUGHT");

        let _write = self.lock_writes();
        let mut notes = self.load_list_for_update(SCRIBE_FILE)?;
        let entry = ScribeEntry {
            id: notes.len() as u64 + 1,
            timestamp: iso_now(),
            content: content.to_string(),
        };
        let id = entry.id;
        notes.push(serde_json::to_value(entry)?);
        self.save_json(SCRIBE_FILE, &notes)?;
        Ok(id)
    }

    pub fn notes(&self) -> Vec<ScribeEntry> {
        self.load_entries(SCRIBE_FILE)
    }

    /// Notes whose content contains `query`, case-insensitive, oldest first.
    pub fn search_notes(&self, query: &str) -> Vec<ScribeEntry> {
        let query = query.to_lowercase();
        self.notes()
            .into_iter()
            .filter(|n| n.content.to_lowercase().contains(&query))
            .collect()
    }

    pub fn write_project_update(&self, details: &str) -> Result<String, KnowledgeError> {
        let _op = OpGuard::begin(&self.status, "UPDATING PROJECTS");

        let _write = self.lock_writes();
        let mut projects = self.load_list_for_update(PROJECTS_FILE)?;
        let entry = ProjectEntry {
            id: format!("PRJ-{}", projects.len() + 101),
            timestamp: iso_now(),
            details: details.to_string(),
        };
        let id = entry.id.clone();
        projects.push(serde_json::to_value(entry)?);
        self.save_json(PROJECTS_FILE, &projects)?;
        Ok(id)
    }

    /// Promotes logic to long-term memory. Progress advances in ten steps
    /// before the write happens.
    pub fn archive_to_long_term(&self, title: &str, content: &str) -> Result<String, KnowledgeError> {
        let op = OpGuard::begin(&self.status, "ARCHIVING");

        for step in 1..=ARCHIVE_STEPS {
            op.progress(step as f32 / ARCHIVE_STEPS as f32);
            if !self.archive_step.is_zero() {
                std::thread::sleep(self.archive_step);
            }
        }

        let _write = self.lock_writes();
        let shape_error = || KnowledgeError::Shape {
            path: self.path(LONG_TERM_FILE),
            expected: "object with an archived_solutions array",
        };
        let mut memory = match self.load_for_update(LONG_TERM_FILE)? {
            None => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => return Err(shape_error()),
        };
        let now = Local::now();
        let solution = ArchivedSolution {
            id: format!("SOL_{}", now.format("%y%m%d_%H%M")),
            title: title.to_string(),
            content: content.to_string(),
            timestamp: iso_now(),
        };
        let id = solution.id.clone();
        let solutions = memory
            .entry("archived_solutions")
            .or_insert_with(|| Value::Array(Vec::new()));
        match solutions {
            Value::Array(items) => items.push(serde_json::to_value(solution)?),
            _ => return Err(shape_error()),
        }
        self.save_json(LONG_TERM_FILE, &memory)?;
        Ok(id)
    }

    pub fn write_session_summary(&self, last_focus: &str) -> Result<SessionSummary, KnowledgeError> {
        let _op = OpGuard::begin(&self.status, "SAVING SESSION");

        let now = Local::now();
        let summary = SessionSummary {
            session_id: now.format("%Y-%m-%d_S%H").to_string(),
            timestamp: iso_now(),
            last_focus: last_focus.to_string(),
        };
        let _write = self.lock_writes();
        self.save_json(SESSION_FILE, &summary)?;
        Ok(summary)
    }
}
