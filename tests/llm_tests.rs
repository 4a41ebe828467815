mod common;

use common::serve_once;
use luma::config::LlmConfig;
use luma::memory::{ArchivedSolution, KnowledgeContext, ProjectEntry};
use luma::services::llm::{LLMService, PromptBuilder};
use luma::skills::IntentClass;
use serde_json::{json, Value};

fn service(addr: std::net::SocketAddr) -> LLMService {
    LLMService::new(&LlmConfig {
        url: format!("http://{}/api/generate", addr),
        model: "phi3".to_string(),
        timeout_secs: 5,
    })
}

#[tokio::test]
async fn test_complete_posts_generate_request() {
    let reply = json!({ "model": "phi3", "response": "  Hello there.  ", "done": true });
    let (addr, server) = serve_once("200 OK", "application/json", reply.to_string().into_bytes()).await;

    let text = service(addr).complete("User: hi\nLuma:").await.unwrap();
    assert_eq!(text, "Hello there.");

    let captured = server.await.unwrap();
    assert!(captured.head.starts_with("POST /api/generate"));
    let body: Value = serde_json::from_slice(&captured.body).unwrap();
    assert_eq!(body["model"], "phi3");
    assert_eq!(body["prompt"], "User: hi\nLuma:");
    assert_eq!(body["stream"], false);
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let (addr, server) = serve_once("500 Internal Server Error", "text/plain", b"boom".to_vec()).await;

    let err = service(addr).complete("hi").await.unwrap_err();
    assert!(err.to_string().contains("500"));
    server.await.unwrap();
}

#[tokio::test]
async fn test_empty_completion_is_an_error() {
    let reply = json!({ "response": "   " });
    let (addr, server) = serve_once("200 OK", "application/json", reply.to_string().into_bytes()).await;

    assert!(service(addr).complete("hi").await.is_err());
    server.await.unwrap();
}

#[tokio::test]
async fn test_unreachable_model_fails_fast() {
    // Bind then drop to get a closed port
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    assert!(service(addr).complete("hi").await.is_err());
}

#[tokio::test]
async fn test_prompt_uses_default_persona_and_ends_with_turn() {
    let builder = PromptBuilder::new("Lau", 6);
    let prompt = builder.build(&KnowledgeContext::default(), &[], "  hello  ", IntentClass::Secondary);

    assert!(prompt.starts_with("You are Luma"));
    assert!(prompt.ends_with("User: hello\nLuma:"));
    assert!(!prompt.contains("engineering focus"));
}

#[tokio::test]
async fn test_prompt_sections_and_history_window() {
    let mut ctx = KnowledgeContext {
        persona: Some("PERSONA".to_string()),
        guardrails: Some("Never guess.".to_string()),
        ..Default::default()
    };
    ctx.profile.insert("role".to_string(), json!("engineer"));
    ctx.solutions = (1..=5)
        .map(|i| ArchivedSolution {
            id: format!("SOL_{}", i),
            title: format!("Solution {}", i),
            content: String::new(),
            timestamp: String::new(),
        })
        .collect();
    ctx.projects = vec![ProjectEntry {
        id: "PRJ-101".to_string(),
        timestamp: String::new(),
        details: "orb renderer".to_string(),
    }];
    let history: Vec<String> = (0..10).map(|i| format!("User: line {}", i)).collect();

    let prompt = PromptBuilder::new("Lau", 4).build(&ctx, &history, "fix it", IntentClass::Core);

    assert!(prompt.starts_with("PERSONA\n\nGuardrails:\nNever guess."));
    assert!(prompt.contains("Lau is in engineering focus."));
    assert!(prompt.contains("About Lau:\n- role: engineer"));
    assert!(!prompt.contains("Solution 2 "));
    assert!(prompt.contains("- Solution 5 (SOL_5)"));
    assert!(prompt.contains("- Solution 3 (SOL_3)"));
    assert!(prompt.contains("- PRJ-101: orb renderer"));
    assert!(!prompt.contains("line 5"));
    assert!(prompt.contains("User: line 6\nUser: line 7\nUser: line 8\nUser: line 9"));
    assert!(prompt.ends_with("User: fix it\nLuma:"));
}
