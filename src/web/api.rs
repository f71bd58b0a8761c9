// src/web/api.rs
// REST API handlers

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info, warn};

use crate::error::{PinchatError, Result};
use crate::extract;
use crate::openai::CompletionOutcome;
use crate::retry::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, retry_async};
use crate::store;
use crate::web::MAX_UPLOAD_BYTES;
use crate::web::state::AppState;

/// Rejection for uploads over the size cap
const OVERSIZED_UPLOAD_MESSAGE: &str =
    "File size exceeds the 10 MB limit. Please upload a smaller file.";
/// Shown when the provider keeps rate limiting after retries
const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";
/// Shown when the model comes back with an empty answer
const EMPTY_RESPONSE_MESSAGE: &str = "Failed to get a response. Please try again.";
/// Catch-all for unclassified processing failures
const GENERIC_ERROR_MESSAGE: &str = "An error occurred while processing your request.";
/// Status line after feedback is recorded
const FEEDBACK_THANKS_MESSAGE: &str = "Thank you for your feedback!";

/// JSON envelope for all API responses
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub text: String,
}

// ═══════════════════════════════════════
// HEALTH
// ═══════════════════════════════════════

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ═══════════════════════════════════════
// UPLOAD
// ═══════════════════════════════════════

/// Upload pipeline: size check, save under the files directory, extract the
/// document text, then pin. Pinning is not retried, and its failure is
/// non-fatal - the extracted text is already in place for chatting.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let (file_name, bytes) = match read_file_field(&mut multipart).await {
        Ok(Some(pair)) => pair,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::err("missing file field in upload")),
            );
        }
        Err(e) => {
            warn!(error = %e, "Rejected malformed upload");
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::err(e.to_string())),
            );
        }
    };

    // The size cap is checked before anything touches disk or the pinning
    // service
    if bytes.len() > MAX_UPLOAD_BYTES {
        warn!(file = %file_name, size = bytes.len(), "Rejected oversized upload");
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err(OVERSIZED_UPLOAD_MESSAGE)),
        );
    }

    let mut session = state.session.lock().await;

    let saved_path = state.files_dir.join(&file_name);
    if let Err(e) = tokio::fs::write(&saved_path, &bytes).await {
        error!(path = %saved_path.display(), error = %e, "Failed to save uploaded file");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::err(GENERIC_ERROR_MESSAGE)),
        );
    }

    let text = match extract::extract_text(&saved_path) {
        Ok(text) => text,
        Err(e) => {
            error!(file = %file_name, error = %e, "Failed to extract text from upload");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err(GENERIC_ERROR_MESSAGE)),
            );
        }
    };
    session.set_document(file_name.as_str(), text);

    info!(file = %file_name, "Uploading PDF to Pinata");
    let cid = state.pinata.upload_document(&saved_path).await;
    match &cid {
        Some(cid) => {
            info!(cid = %cid, "PDF uploaded to Pinata");
            session.document_cid = Some(cid.clone());
            session.set_status(format!("File uploaded to IPFS with CID: {}", cid));
        }
        None => {
            error!(file = %file_name, "Failed to upload PDF to Pinata");
            session.set_status("Failed to upload PDF to Pinata.");
        }
    }

    let status = session.status_message.clone();
    (
        StatusCode::OK,
        Json(ApiResponse::ok(serde_json::json!({
            "file_name": file_name,
            "cid": cid,
            "status": status,
        }))),
    )
}

/// Pull the `file` part out of a multipart upload
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<(String, Vec<u8>)>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PinchatError::InvalidInput(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(sanitize_file_name)
            .unwrap_or_else(|| "document.pdf".to_string());

        let bytes = field
            .bytes()
            .await
            .map_err(|e| PinchatError::InvalidInput(format!("failed to read upload: {}", e)))?;

        return Ok(Some((file_name, bytes.to_vec())));
    }

    Ok(None)
}

/// Reduce a client-supplied name to its final path component
fn sanitize_file_name(raw: &str) -> String {
    Path::new(raw)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document.pdf")
        .to_string()
}

// ═══════════════════════════════════════
// CHAT
// ═══════════════════════════════════════

/// Ask pipeline: the one retried remote call in the system. The final
/// outcome always produces a visible reply; a non-empty reply becomes a
/// persisted turn, an empty one is reported without touching the history.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let question = req.question.trim().to_string();
    if question.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err("question must not be empty")),
        );
    }

    info!(question = %question, "User input");

    let mut session = state.session.lock().await;
    let document = session.document_text.clone();

    let openai = &state.openai;
    let question_ref = question.as_str();
    let document_ref = document.as_str();
    let result = retry_async(
        "completion request",
        DEFAULT_MAX_ATTEMPTS,
        DEFAULT_RETRY_DELAY,
        move || openai.complete(question_ref, document_ref),
    )
    .await;

    let outcome = match result {
        Ok(answer) => CompletionOutcome::Answer(answer),
        Err(e) => CompletionOutcome::from_error(&e),
    };

    let (reply, kind) = match outcome {
        CompletionOutcome::Answer(text) => (text, "answer"),
        CompletionOutcome::RateLimited => (RATE_LIMIT_MESSAGE.to_string(), "rate_limited"),
        CompletionOutcome::Failed(detail) => (format!("Error: {}", detail), "failed"),
    };

    if reply.is_empty() {
        warn!("Completion produced an empty reply");
        return (
            StatusCode::OK,
            Json(ApiResponse::err(EMPTY_RESPONSE_MESSAGE)),
        );
    }

    session.push_turn(question.as_str(), reply.as_str());
    store::save_chat_history(&state.chat_history_path, &session.history);

    (
        StatusCode::OK,
        Json(ApiResponse::ok(serde_json::json!({
            "reply": reply,
            "kind": kind,
        }))),
    )
}

/// Get the ordered conversation turns, oldest first
pub async fn get_chat_history(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    Json(ApiResponse::ok(session.history.clone()))
}

/// Empty the conversation and persist the empty history
pub async fn clear_chat_history(State(state): State<AppState>) -> impl IntoResponse {
    let mut session = state.session.lock().await;
    session.clear_history();
    store::save_chat_history(&state.chat_history_path, &session.history);
    info!("User cleared chat history");
    Json(ApiResponse::ok(serde_json::json!({ "cleared": true })))
}

// ═══════════════════════════════════════
// FEEDBACK & STATUS
// ═══════════════════════════════════════

pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let text = req.text.trim();
    if text.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err("feedback must not be empty")),
        );
    }

    store::append_feedback(&state.feedback_path, text);
    info!(feedback = %text, "User feedback");

    let mut session = state.session.lock().await;
    session.set_status(FEEDBACK_THANKS_MESSAGE);

    (
        StatusCode::OK,
        Json(ApiResponse::ok(serde_json::json!({
            "status": FEEDBACK_THANKS_MESSAGE,
        }))),
    )
}

/// Session status panel as data: last status line plus document facts
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    Json(ApiResponse::ok(serde_json::json!({
        "status_message": session.status_message,
        "uploaded_file_name": session.uploaded_file_name,
        "document_cid": session.document_cid,
        "document_loaded": session.has_document(),
    })))
}
