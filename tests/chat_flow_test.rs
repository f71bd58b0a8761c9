// tests/chat_flow_test.rs
// Ask pipeline through the HTTP surface: retries, outcome presentation,
// history persistence, clear, and feedback

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{Json, Router, http::StatusCode, routing::post};
use tokio::sync::Mutex;

use pinchat::openai::OpenAIClient;
use pinchat::pinata::PinataClient;
use pinchat::session::SessionContext;
use pinchat::web::state::AppState;

/// Bind a router on an ephemeral loopback port
async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Application state wired to stub services and a temp data directory
fn test_state(openai_base: &str, data_dir: &std::path::Path) -> AppState {
    std::fs::create_dir_all(data_dir.join("files")).unwrap();
    AppState {
        session: Arc::new(Mutex::new(SessionContext::new())),
        pinata: PinataClient::new("http://127.0.0.1:1", "key", "secret"),
        openai: OpenAIClient::new(openai_base, "test-key"),
        files_dir: data_dir.join("files"),
        chat_history_path: data_dir.join("chat_history.json"),
        feedback_path: data_dir.join("feedback.txt"),
    }
}

async fn spawn_app(state: AppState) -> String {
    let addr = spawn(pinchat::web::create_router(state)).await;
    format!("http://{}", addr)
}

fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({ "choices": [{ "message": { "content": content } }] })
}

async fn ask(base: &str, question: &str) -> (reqwest::StatusCode, serde_json::Value) {
    let resp = reqwest::Client::new()
        .post(format!("{}/api/chat", base))
        .json(&serde_json::json!({ "question": question }))
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

async fn history(base: &str) -> serde_json::Value {
    reqwest::Client::new()
        .get(format!("{}/api/chat/history", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

// ============================================================================
// Answers
// ============================================================================

#[tokio::test]
async fn answer_is_returned_and_persisted() {
    let captured: Arc<std::sync::Mutex<Option<serde_json::Value>>> =
        Arc::new(std::sync::Mutex::new(None));
    let captured_in_stub = captured.clone();

    let stub = Router::new().route(
        "/chat/completions",
        post(move |Json(req): Json<serde_json::Value>| {
            let captured = captured_in_stub.clone();
            async move {
                *captured.lock().unwrap() = Some(req);
                Json(completion_body("Paris is the capital of France."))
            }
        }),
    );
    let stub_addr = spawn(stub).await;

    let data_dir = tempfile::tempdir().unwrap();
    let base = spawn_app(test_state(&format!("http://{}", stub_addr), data_dir.path())).await;

    // Whitespace around the question is trimmed before anything else
    let (status, body) = ask(&base, "  What is the capital?  ").await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["reply"], "Paris is the capital of France.");
    assert_eq!(body["data"]["kind"], "answer");

    // The upstream saw the fixed three-message exchange
    let request = captured.lock().unwrap().clone().unwrap();
    assert_eq!(request["model"], "gpt-3.5-turbo");
    assert_eq!(request["max_tokens"], 100);
    let messages = request["messages"].as_array().unwrap().clone();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[2]["content"], "What is the capital?");

    // One turn in memory and the same turn on disk
    let turns = history(&base).await;
    assert_eq!(turns["data"].as_array().unwrap().len(), 1);
    assert_eq!(turns["data"][0]["user"], "What is the capital?");
    assert_eq!(turns["data"][0]["ai"], "Paris is the capital of France.");

    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(data_dir.path().join("chat_history.json")).unwrap())
            .unwrap();
    assert_eq!(on_disk, turns["data"]);
}

#[tokio::test]
async fn empty_answer_is_not_retried_and_not_persisted() {
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_in_stub = hits.clone();

    let stub = Router::new().route(
        "/chat/completions",
        post(move || {
            let hits = hits_in_stub.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(completion_body(""))
            }
        }),
    );
    let stub_addr = spawn(stub).await;

    let data_dir = tempfile::tempdir().unwrap();
    let base = spawn_app(test_state(&format!("http://{}", stub_addr), data_dir.path())).await;

    let (status, body) = ask(&base, "Anything there?").await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to get a response. Please try again.");

    // An empty answer is still a completed call: exactly one attempt
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // No turn recorded, nothing written to disk
    assert!(history(&base).await["data"].as_array().unwrap().is_empty());
    assert!(!data_dir.path().join("chat_history.json").exists());
}

// ============================================================================
// Error outcomes (these wait out the real retry delays)
// ============================================================================

#[tokio::test]
async fn rate_limited_provider_yields_fixed_message_after_retries() {
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_in_stub = hits.clone();

    let stub = Router::new().route(
        "/chat/completions",
        post(move || {
            let hits = hits_in_stub.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                (StatusCode::TOO_MANY_REQUESTS, "Rate Limit exceeded")
            }
        }),
    );
    let stub_addr = spawn(stub).await;

    let data_dir = tempfile::tempdir().unwrap();
    let base = spawn_app(test_state(&format!("http://{}", stub_addr), data_dir.path())).await;

    let (status, body) = ask(&base, "Will this pass?").await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body["success"], true);
    // The fixed message, not the provider's error text
    assert_eq!(
        body["data"]["reply"],
        "Rate limit exceeded. Please try again later."
    );
    assert_eq!(body["data"]["kind"], "rate_limited");

    // All three attempts were spent before classification
    assert_eq!(hits.load(Ordering::SeqCst), 3);

    // The presentation string is recorded like any other reply
    let turns = history(&base).await;
    assert_eq!(
        turns["data"][0]["ai"],
        "Rate limit exceeded. Please try again later."
    );
}

#[tokio::test]
async fn other_provider_failures_surface_as_error_reply() {
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_in_stub = hits.clone();

    let stub = Router::new().route(
        "/chat/completions",
        post(move || {
            let hits = hits_in_stub.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
            }
        }),
    );
    let stub_addr = spawn(stub).await;

    let data_dir = tempfile::tempdir().unwrap();
    let base = spawn_app(test_state(&format!("http://{}", stub_addr), data_dir.path())).await;

    let (status, body) = ask(&base, "And this?").await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body["data"]["kind"], "failed");
    let reply = body["data"]["reply"].as_str().unwrap();
    assert!(reply.starts_with("Error: "));
    assert!(reply.contains("upstream exploded"));

    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

// ============================================================================
// Input validation
// ============================================================================

#[tokio::test]
async fn blank_question_is_rejected() {
    let data_dir = tempfile::tempdir().unwrap();
    let base = spawn_app(test_state("http://127.0.0.1:1", data_dir.path())).await;

    let (status, body) = ask(&base, "   ").await;
    assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

// ============================================================================
// Clear and feedback
// ============================================================================

#[tokio::test]
async fn clear_empties_memory_and_disk() {
    let stub = Router::new().route(
        "/chat/completions",
        post(|| async { Json(completion_body("An answer.")) }),
    );
    let stub_addr = spawn(stub).await;

    let data_dir = tempfile::tempdir().unwrap();
    let base = spawn_app(test_state(&format!("http://{}", stub_addr), data_dir.path())).await;

    let (_, body) = ask(&base, "Question one").await;
    assert_eq!(body["success"], true);

    let resp = reqwest::Client::new()
        .post(format!("{}/api/chat/clear", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    assert!(history(&base).await["data"].as_array().unwrap().is_empty());

    // The persisted document is the empty array, not a stale copy
    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(data_dir.path().join("chat_history.json")).unwrap())
            .unwrap();
    assert_eq!(on_disk, serde_json::json!([]));
}

#[tokio::test]
async fn feedback_appends_in_order() {
    let data_dir = tempfile::tempdir().unwrap();
    let base = spawn_app(test_state("http://127.0.0.1:1", data_dir.path())).await;

    for text in ["A", "B"] {
        let resp = reqwest::Client::new()
            .post(format!("{}/api/feedback", base))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["data"]["status"], "Thank you for your feedback!");
    }

    let contents = std::fs::read_to_string(data_dir.path().join("feedback.txt")).unwrap();
    assert_eq!(contents, "A\nB\n");
}

#[tokio::test]
async fn blank_feedback_is_rejected() {
    let data_dir = tempfile::tempdir().unwrap();
    let base = spawn_app(test_state("http://127.0.0.1:1", data_dir.path())).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/api/feedback", base))
        .json(&serde_json::json!({ "text": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    assert!(!data_dir.path().join("feedback.txt").exists());
}
