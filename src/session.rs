// src/session.rs
// Per-session conversation state

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::store;

/// One question/answer exchange in the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub user: String,
    pub ai: String,
}

/// Mutable state for one chat session: the conversation so far plus the
/// currently loaded document.
#[derive(Debug, Default)]
pub struct SessionContext {
    /// Ordered conversation turns, oldest first
    pub history: Vec<ChatTurn>,
    /// Extracted text of the current document, replaced wholesale per upload
    pub document_text: String,
    /// CID returned by the pinning service for the current document
    pub document_cid: Option<String>,
    /// Original name of the last uploaded file
    pub uploaded_file_name: Option<String>,
    /// Last user-facing status line
    pub status_message: String,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace history with the last persisted copy, if one exists.
    /// A missing or unreadable file leaves the current history untouched.
    pub fn restore_history(&mut self, path: &Path) {
        if let Some(turns) = store::load_chat_history(path) {
            self.history = turns;
        }
    }

    /// Append a completed exchange
    pub fn push_turn(&mut self, user: impl Into<String>, ai: impl Into<String>) {
        self.history.push(ChatTurn {
            user: user.into(),
            ai: ai.into(),
        });
    }

    /// Drop all recorded turns
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Install a freshly extracted document, replacing any previous one.
    /// The CID resets until the new file is pinned.
    pub fn set_document(&mut self, file_name: impl Into<String>, text: String) {
        self.uploaded_file_name = Some(file_name.into());
        self.document_text = text;
        self.document_cid = None;
    }

    pub fn has_document(&self) -> bool {
        !self.document_text.is_empty()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }
}
