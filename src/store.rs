// src/store.rs
// Flat-file persistence for chat history and feedback

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, error};

use crate::session::ChatTurn;

/// Overwrite `path` with the full chat history as a JSON array.
///
/// Persistence is fire-and-forget: a failed write is logged and swallowed so
/// a disk problem never interrupts the conversation.
pub fn save_chat_history(path: &Path, history: &[ChatTurn]) {
    let json = match serde_json::to_string_pretty(history) {
        Ok(json) => json,
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to serialize chat history");
            return;
        }
    };

    match std::fs::write(path, json) {
        Ok(()) => debug!(path = %path.display(), turns = history.len(), "Chat history saved"),
        Err(e) => error!(path = %path.display(), error = %e, "Failed to save chat history"),
    }
}

/// Load the persisted chat history.
///
/// `None` means nothing usable on disk: the file is absent (silent) or
/// unreadable/malformed (logged). Callers keep their in-memory history in
/// that case.
pub fn load_chat_history(path: &Path) -> Option<Vec<ChatTurn>> {
    if !path.exists() {
        return None;
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to read chat history");
            return None;
        }
    };

    match serde_json::from_str(&contents) {
        Ok(turns) => {
            debug!(path = %path.display(), "Chat history loaded");
            Some(turns)
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to parse chat history");
            None
        }
    }
}

/// Append one line of user feedback, creating the file on first use.
/// Failures are logged and swallowed like the other store writes.
pub fn append_feedback(path: &Path, feedback: &str) {
    let result = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| writeln!(file, "{}", feedback));

    match result {
        Ok(()) => debug!(path = %path.display(), "Feedback saved"),
        Err(e) => error!(path = %path.display(), error = %e, "Failed to save feedback"),
    }
}
