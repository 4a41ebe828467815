use anyhow::Result;
use luma::memory::{KnowledgeStore, SessionSummary, SESSION_FILE};
use luma::skills::system::SystemProbe;
use luma::skills::{classify_intent, match_skill, IntentClass, SkillExecutor, SkillKind};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{tempdir, TempDir};

#[derive(Default)]
struct FakeProbe {
    opened: Mutex<Vec<String>>,
}

impl SystemProbe for FakeProbe {
    fn cpu_percent(&self) -> f32 {
        42.5
    }

    fn open_url(&self, url: &str) -> Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

fn executor() -> (SkillExecutor, Arc<FakeProbe>, TempDir) {
    let dir = tempdir().unwrap();
    let store = KnowledgeStore::new(dir.path()).with_archive_step(Duration::ZERO);
    let probe = Arc::new(FakeProbe::default());
    let exec = SkillExecutor::new(Arc::new(store), probe.clone(), "Lau");
    (exec, probe, dir)
}

#[tokio::test]
async fn test_trigger_table_order() {
    let kind = |text: &str| match_skill(text).map(|m| m.kind);

    assert_eq!(kind("Give me the CPU LOAD"), Some(SkillKind::TelemetryPulse));
    assert_eq!(kind("system vitals"), Some(SkillKind::TelemetryPulse));
    assert_eq!(kind("file heartbeat main.py"), Some(SkillKind::FileHeartbeat));
    assert_eq!(kind("look up tokio select"), Some(SkillKind::WebSearch));
    assert_eq!(kind("remember that the build is green"), Some(SkillKind::Scribe));
    assert_eq!(kind("archive this"), Some(SkillKind::Archive));
    assert_eq!(kind("project milestone reached"), Some(SkillKind::ManageProjects));
    assert_eq!(kind("search memory for milk"), Some(SkillKind::MemoryRecall));
    assert_eq!(kind("what did I say about milk"), Some(SkillKind::MemoryRecall));
    assert_eq!(kind("how is the weather"), None);

    let hit = match_skill("please note down this").unwrap();
    assert_eq!(hit.trigger, "note down");
}

#[tokio::test]
async fn test_classify_intent() {
    assert_eq!(classify_intent("fix the error in main.py"), (IntentClass::Core, 200));
    assert_eq!(classify_intent("LUMA-42 is blocked"), (IntentClass::Core, 200));
    assert_eq!(classify_intent("good morning"), (IntentClass::Secondary, 80));
}

#[tokio::test]
async fn test_telemetry_pulse() {
    let (exec, _probe, _dir) = executor();
    assert_eq!(
        exec.execute(SkillKind::TelemetryPulse, "cpu load", ""),
        "CPU is holding at 42.5 percent, Master Lau."
    );
}

#[tokio::test]
async fn test_file_heartbeat() {
    let (exec, _probe, dir) = executor();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "x").unwrap();

    let reply = exec.execute(SkillKind::FileHeartbeat, &format!("file heartbeat {}", file.display()), "");
    assert!(reply.starts_with(&format!("The heartbeat for {} was last seen at ", file.display())));

    let reply = exec.execute(SkillKind::FileHeartbeat, "file heartbeat please", "");
    assert_eq!(reply, "I can't find a file heartbeat for that specific target.");
}

#[tokio::test]
async fn test_web_search_opens_query() {
    let (exec, probe, _dir) = executor();

    let reply = exec.execute(SkillKind::WebSearch, "Search for rust lifetimes", "");

    assert_eq!(reply, "Opening an uplink for 'rust lifetimes' now.");
    let opened = probe.opened.lock().unwrap();
    assert_eq!(opened.len(), 1);
    assert!(opened[0].starts_with("https://www.google.com/search?q=rust"));
    assert!(opened[0].contains("lifetimes"));
}

#[tokio::test]
async fn test_scribe_and_recall() {
    let (exec, _probe, _dir) = executor();

    assert_eq!(
        exec.execute(SkillKind::Scribe, "Note down buy milk", ""),
        "Thought indexed, Lau. Scribe Entry 1 is secured."
    );
    assert_eq!(
        exec.execute(SkillKind::Scribe, "remember that mom wants milk too", ""),
        "Thought indexed, Lau. Scribe Entry 2 is secured."
    );

    let notes = exec.store().notes();
    assert_eq!(notes[0].content, "buy milk");
    assert_eq!(notes[1].content, "mom wants milk too");

    // Newest match wins
    assert_eq!(
        exec.execute(SkillKind::MemoryRecall, "search memory for milk", ""),
        "I've found a match in my archives: 'mom wants milk too'. Does that help, Lau?"
    );
    assert_eq!(
        exec.execute(SkillKind::MemoryRecall, "recall note about quantum", ""),
        "I've scanned the scribe logs, but I can't find anything related to 'quantum'."
    );
}

#[tokio::test]
async fn test_archive_promotes_last_response() {
    let (exec, _probe, _dir) = executor();

    let reply = exec.execute(SkillKind::Archive, "archive this", "Swap the lock order.");

    assert!(reply.starts_with("Logic promoted to archive. ID: SOL_"));
    let ctx = exec.store().load_context();
    assert_eq!(ctx.solutions.len(), 1);
    assert_eq!(ctx.solutions[0].title, "Manual Archive");
    assert_eq!(ctx.solutions[0].content, "Swap the lock order.");
    assert!(!exec.store().status().active);
}

#[tokio::test]
async fn test_project_updates_are_numbered() {
    let (exec, _probe, _dir) = executor();

    assert_eq!(
        exec.execute(SkillKind::ManageProjects, "Update project renderer rewrite done", ""),
        "Project telemetry updated, Lau. Reference ID: PRJ-101."
    );
    assert_eq!(
        exec.execute(SkillKind::ManageProjects, "new project voice cache", ""),
        "Project telemetry updated, Lau. Reference ID: PRJ-102."
    );

    let projects = exec.store().load_context().projects;
    assert_eq!(projects[0].details, "renderer rewrite done");
    assert_eq!(projects[1].details, "new project voice cache");
}

#[tokio::test]
async fn test_session_summary_records_last_line() {
    let (exec, _probe, _dir) = executor();

    let reply = exec.save_session_summary(&["User: hi".to_string(), "Luma: Hello.".to_string()]);
    assert_eq!(reply, "Session highlights have been indexed, Master Lau.");

    let summary: SessionSummary = exec.store().load_json(SESSION_FILE);
    assert_eq!(summary.last_focus, "Luma: Hello.");
    assert!(summary.session_id.contains("_S"));

    exec.save_session_summary(&[]);
    let summary: SessionSummary = exec.store().load_json(SESSION_FILE);
    assert_eq!(summary.last_focus, "No activity.");
}

#[tokio::test]
async fn test_failures_become_apologies() {
    let dir = tempdir().unwrap();
    // A file where the knowledge directory should be
    let blocker = dir.path().join("knowledge");
    std::fs::write(&blocker, "not a dir").unwrap();
    let store = KnowledgeStore::new(&blocker);
    let exec = SkillExecutor::new(Arc::new(store), Arc::new(FakeProbe::default()), "Lau");

    let reply = exec.execute(SkillKind::Scribe, "note down anything", "");
    assert_eq!(reply, "Something went wrong while scribing that thought, Lau.");
}
