// src/extract.rs
//! PDF text extraction for the document context

use std::path::Path;
use tracing::debug;

use crate::error::{PinchatError, Result};

/// Extract the text content of a PDF.
///
/// Page texts come back newline-joined; cleanup normalizes whitespace so the
/// document context stays compact.
pub fn extract_text(path: &Path) -> Result<String> {
    let raw = pdf_extract::extract_text(path)
        .map_err(|e| PinchatError::Extraction(format!("failed to extract PDF text: {}", e)))?;

    let text = clean_text(&raw);
    debug!(path = %path.display(), chars = text.len(), "Extracted document text");
    Ok(text)
}

/// Strip control characters and collapse blank lines in extracted text
fn clean_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect();

    let lines: Vec<&str> = cleaned
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect();

    lines.join("\n")
}
