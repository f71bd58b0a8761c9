// src/openai.rs
// OpenAI chat-completion client

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::{PinchatError, Result};

/// Request timeout for a single completion attempt
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Connect timeout for the completion endpoint
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
/// Model used for every completion
const COMPLETION_MODEL: &str = "gpt-3.5-turbo";
/// Cap on generated tokens per answer
const MAX_COMPLETION_TOKENS: u32 = 100;
/// Sampling temperature
const COMPLETION_TEMPERATURE: f32 = 0.7;
/// System instruction framing the assistant's role
const SYSTEM_PROMPT: &str = "You are a helpful assistant for answering questions about the PDF.";

/// Chat completion request (OpenAI format)
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: String,
    content: String,
}

impl Message {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

/// Non-streaming chat response (OpenAI format)
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ResponseChoice>,
}

#[derive(Debug, Deserialize)]
struct ResponseChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Final shape of a completion once retries are exhausted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The model produced an answer
    Answer(String),
    /// The provider reported rate limiting
    RateLimited,
    /// Any other failure, with detail for the log
    Failed(String),
}

impl CompletionOutcome {
    /// Classify a completion error by its detail text.
    /// Rate limiting is recognized by substring, case-insensitively.
    pub fn from_error(err: &PinchatError) -> Self {
        let detail = err.to_string();
        if detail.to_lowercase().contains("rate limit") {
            CompletionOutcome::RateLimited
        } else {
            CompletionOutcome::Failed(detail)
        }
    }
}

/// Client for the OpenAI chat-completions API
#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAIClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_timeout(base_url, api_key, REQUEST_TIMEOUT)
    }

    /// Build a client with a custom request timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// One completion attempt: the fixed three-message exchange built from
    /// the document text and the user's question.
    ///
    /// The document context rides along unmodified - no truncation or token
    /// budgeting. Each attempt is bounded by the client's request timeout, so
    /// a stalled provider fails the call instead of hanging it. Errors carry
    /// the provider's status and body text so the caller can classify them.
    pub async fn complete(&self, question: &str, document_context: &str) -> Result<String> {
        let request_id = Uuid::new_v4().to_string();
        let request = build_request(question, document_context);

        let url = format!("{}/chat/completions", self.base_url);
        debug!(request_id = %request_id, model = COMPLETION_MODEL, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| PinchatError::Completion(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(request_id = %request_id, status = %status, body = %body, "Completion request failed");
            return Err(PinchatError::Completion(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PinchatError::Completion(format!("failed to read response: {}", e)))?;

        let answer = parse_completion_response(&body)?;
        debug!(request_id = %request_id, chars = answer.len(), "Completion received");
        Ok(answer)
    }
}

/// Build the fixed three-message exchange: system instruction, document
/// context, then the question
fn build_request(question: &str, document_context: &str) -> ChatRequest {
    ChatRequest {
        model: COMPLETION_MODEL.to_string(),
        messages: vec![
            Message::new("system", SYSTEM_PROMPT),
            Message::new("user", document_context),
            Message::new("user", question),
        ],
        max_tokens: MAX_COMPLETION_TOKENS,
        temperature: COMPLETION_TEMPERATURE,
    }
}

/// Pull the first choice's message content out of a completion response body.
/// A null content field becomes the empty answer; missing choices are an
/// error shape.
fn parse_completion_response(body: &str) -> Result<String> {
    let data: ChatResponse = serde_json::from_str(body)
        .map_err(|e| PinchatError::Completion(format!("failed to parse response: {}", e)))?;

    let choice = data
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| PinchatError::Completion("no choices in response".to_string()))?;

    Ok(choice.message.content.unwrap_or_default())
}
