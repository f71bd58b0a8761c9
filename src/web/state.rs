// src/web/state.rs
// Shared application state

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::openai::OpenAIClient;
use crate::pinata::PinataClient;
use crate::session::SessionContext;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The single chat session; the mutex serializes its operations
    pub session: Arc<Mutex<SessionContext>>,

    /// Pinata pinning client
    pub pinata: PinataClient,

    /// OpenAI completion client
    pub openai: OpenAIClient,

    /// Directory uploaded files are saved under
    pub files_dir: PathBuf,

    /// Persisted chat history document
    pub chat_history_path: PathBuf,

    /// Append-only feedback log
    pub feedback_path: PathBuf,
}

impl AppState {
    /// Create application state from configuration.
    /// Missing API keys become empty credentials; the affected remote call
    /// then fails through its normal error path.
    pub fn new(config: &Config) -> Self {
        Self {
            session: Arc::new(Mutex::new(SessionContext::new())),
            pinata: PinataClient::new(
                config.pinata_base_url.clone(),
                config.api_keys.pinata.clone().unwrap_or_default(),
                config.api_keys.pinata_secret.clone().unwrap_or_default(),
            ),
            openai: OpenAIClient::new(
                config.openai_base_url.clone(),
                config.api_keys.openai.clone().unwrap_or_default(),
            ),
            files_dir: config.files_dir(),
            chat_history_path: config.chat_history_path(),
            feedback_path: config.feedback_path(),
        }
    }
}
