// src/config.rs
// Environment-based configuration - single source of truth for all env vars

use std::path::PathBuf;
use tracing::{debug, warn};

/// Default base URL for the OpenAI completion API (OPENAI_BASE_URL overrides)
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Default base URL for the Pinata pinning API (PINATA_BASE_URL overrides)
pub const DEFAULT_PINATA_BASE_URL: &str = "https://api.pinata.cloud";
/// Default directory for persisted files
pub const DEFAULT_DATA_DIR: &str = "data";

/// API keys loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// OpenAI API key (OPENAI_API_KEY)
    pub openai: Option<String>,
    /// Pinata API key (PINATA_API_KEY)
    pub pinata: Option<String>,
    /// Pinata secret API key (PINATA_SECRET_API_KEY)
    pub pinata_secret: Option<String>,
}

impl ApiKeys {
    /// Load API keys from environment variables (single source of truth)
    pub fn from_env() -> Self {
        let keys = Self {
            openai: Self::read_key("OPENAI_API_KEY"),
            pinata: Self::read_key("PINATA_API_KEY"),
            pinata_secret: Self::read_key("PINATA_SECRET_API_KEY"),
        };
        keys.log_status();
        keys
    }

    /// Read a single API key from environment, filtering empty values
    fn read_key(name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|k| !k.trim().is_empty())
    }

    /// Check if completions are available (requires OpenAI key)
    pub fn has_completion(&self) -> bool {
        self.openai.is_some()
    }

    /// Check if pinning is available (requires both Pinata keys)
    pub fn has_pinning(&self) -> bool {
        self.pinata.is_some() && self.pinata_secret.is_some()
    }

    /// Log which API keys are available (without exposing values)
    fn log_status(&self) {
        let mut available = Vec::new();
        if self.openai.is_some() {
            available.push("OpenAI");
        }
        if self.has_pinning() {
            available.push("Pinata");
        }

        if available.is_empty() {
            warn!("No API keys configured - uploads and completions will fail");
        } else {
            debug!(keys = ?available, "API keys loaded");
        }
    }
}

/// Configuration validation result.
/// Nothing here is fatal: missing keys degrade the affected call at request
/// time, so validation only collects warnings.
#[derive(Debug, Default)]
pub struct ConfigValidation {
    pub warnings: Vec<String>,
}

impl ConfigValidation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }
}

/// Service configuration - all env vars in one place
#[derive(Debug, Clone)]
pub struct Config {
    /// API keys for the remote services
    pub api_keys: ApiKeys,
    /// Completion API base URL (OPENAI_BASE_URL)
    pub openai_base_url: String,
    /// Pinning API base URL (PINATA_BASE_URL)
    pub pinata_base_url: String,
    /// Root directory for chat history, feedback, and uploaded files
    /// (PINCHAT_DATA_DIR; the CLI flag overrides it)
    pub data_dir: PathBuf,
}

impl Config {
    /// Load all environment configuration (call once at startup)
    pub fn load() -> Self {
        Self {
            api_keys: ApiKeys::from_env(),
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            pinata_base_url: std::env::var("PINATA_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PINATA_BASE_URL.to_string()),
            data_dir: std::env::var("PINCHAT_DATA_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
        }
    }

    /// Directory uploaded files are saved under
    pub fn files_dir(&self) -> PathBuf {
        self.data_dir.join("files")
    }

    /// Path of the persisted chat history document
    pub fn chat_history_path(&self) -> PathBuf {
        self.data_dir.join("chat_history.json")
    }

    /// Path of the append-only feedback log
    pub fn feedback_path(&self) -> PathBuf {
        self.data_dir.join("feedback.txt")
    }

    /// Validate the configuration
    ///
    /// Missing keys are warnings, not errors: the affected call fails through
    /// its normal error path at request time.
    pub fn validate(&self) -> ConfigValidation {
        let mut validation = ConfigValidation::new();

        if !self.api_keys.has_completion() {
            validation.add_warning("No OpenAI API key configured. Set OPENAI_API_KEY.");
        }

        if !self.api_keys.has_pinning() {
            validation.add_warning(
                "Pinata credentials incomplete. Set PINATA_API_KEY and PINATA_SECRET_API_KEY.",
            );
        }

        validation
    }
}
