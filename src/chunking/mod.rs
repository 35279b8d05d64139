#[cfg(test)]
mod tests;

use std::sync::LazyLock;

use fancy_regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{RaglineError, Result};

/// A source document supplied by the caller for ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Caller-unique identifier
    pub id: String,
    /// Raw text content
    pub content: String,
    /// Optional human-readable label for the source, shown in answers
    pub source_label: Option<String>,
}

impl Document {
    #[inline]
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            source_label: None,
        }
    }

    #[inline]
    pub fn with_source_label(mut self, label: impl Into<String>) -> Self {
        self.source_label = Some(label.into());
        self
    }

    /// The label to display for this document, falling back to its id
    #[inline]
    pub fn source_label(&self) -> &str {
        self.source_label.as_deref().unwrap_or(&self.id)
    }
}

/// A contiguous window of a document's text, the unit of indexing and retrieval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Derived as `<document_id>_<chunk_index>`
    pub id: String,
    /// The text window
    pub content: String,
    /// Back-reference to the parent document
    pub source_document_id: String,
    /// Zero-based position of this chunk within its document
    pub chunk_index: usize,
}

/// Configuration for fixed-size window chunking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Window size in Unicode code points
    pub window_size: usize,
    /// Number of trailing code points repeated at the start of the next window
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            window_size: 500,
            overlap: 50,
        }
    }
}

impl ChunkingConfig {
    /// Check the window/overlap relationship without chunking anything.
    ///
    /// The same checks run on every `chunk()` call; validating once at startup
    /// turns a per-call contract violation into a configuration error.
    #[inline]
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(RaglineError::InvalidArgument(
                "window size must be greater than zero".to_string(),
            ));
        }
        if self.overlap >= self.window_size {
            return Err(RaglineError::InvalidArgument(format!(
                "overlap ({}) must be smaller than window size ({})",
                self.overlap, self.window_size
            )));
        }
        Ok(())
    }
}

/// Split text into overlapping fixed-size windows of Unicode code points.
///
/// Starting at position 0, each window covers
/// `[position, min(position + window_size, len))` and the position advances by
/// `window_size - overlap` until a window reaches the end of the text. The
/// final window may be shorter than `window_size`. Empty text yields no
/// windows.
///
/// Invalid configurations are rejected, never clamped: `window_size` must be
/// positive and `overlap` strictly smaller than `window_size`, since an
/// overlap of `window_size` or more would stop the window from advancing. An
/// overlap of `window_size - 1` is accepted but advances one code point per
/// window, which is slow on large inputs.
#[inline]
pub fn chunk(text: &str, window_size: usize, overlap: usize) -> Result<Vec<String>> {
    if window_size == 0 {
        return Err(RaglineError::InvalidArgument(
            "window size must be greater than zero".to_string(),
        ));
    }
    if overlap >= window_size {
        return Err(RaglineError::InvalidArgument(format!(
            "overlap ({}) must be smaller than window size ({})",
            overlap, window_size
        )));
    }

    // Work on code points so a window never lands inside a multi-byte
    // character.
    let code_points: Vec<char> = text.chars().collect();
    let stride = window_size - overlap;

    let mut windows = Vec::new();
    let mut position = 0;
    while position < code_points.len() {
        let end = (position + window_size).min(code_points.len());
        windows.push(code_points[position..end].iter().collect());
        if end == code_points.len() {
            break;
        }
        position += stride;
    }

    Ok(windows)
}

/// Chunk each document with the given configuration, producing `Chunk` records
/// with derived ids and zero-based per-document indices, in input-document
/// order then window order.
#[inline]
pub fn chunk_documents(documents: &[Document], config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    config.validate()?;

    let mut chunks = Vec::new();
    for document in documents {
        let windows = chunk(&document.content, config.window_size, config.overlap)?;
        for (chunk_index, content) in windows.into_iter().enumerate() {
            chunks.push(Chunk {
                id: format!("{}_{}", document.id, chunk_index),
                content,
                source_document_id: document.id.clone(),
                chunk_index,
            });
        }
    }

    Ok(chunks)
}

static INLINE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("valid regex"));
static LINE_BREAK_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]*\n[^\S\n]*").expect("valid regex"));
static BLANK_LINE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Normalize whitespace ahead of chunking so window boundaries do not depend
/// on source formatting.
///
/// Collapses runs of non-newline whitespace to a single space, strips
/// whitespace around line breaks, collapses runs of blank lines to a single
/// blank line, and trims the ends. Total and idempotent; empty input yields an
/// empty string.
#[inline]
pub fn clean_text(text: &str) -> String {
    let collapsed = INLINE_WHITESPACE.replace_all(text, " ");
    let trimmed_breaks = LINE_BREAK_WHITESPACE.replace_all(&collapsed, "\n");
    let collapsed_blanks = BLANK_LINE_RUNS.replace_all(&trimmed_breaks, "\n\n");
    collapsed_blanks.trim().to_string()
}
