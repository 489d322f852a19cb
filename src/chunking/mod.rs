
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::RagError;
use crate::Result;

/// A contiguous window of a document's text, ready for embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// The trimmed chunk text
    pub text: String,
    /// Zero-based position of this chunk within the document
    pub index: usize,
}

/// Sliding-window chunking parameters, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

impl ChunkingConfig {
    /// A zero step would make the window walk loop forever, so
    /// `overlap >= chunk_size` is rejected outright.
    #[inline]
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(RagError::Config(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Split `text` into overlapping fixed-size windows.
///
/// Consecutive chunks share `overlap` characters. Each emitted chunk is
/// trimmed and non-empty; blank input yields no chunks. The walk stops with
/// the first window that reaches the end of the text, so for long inputs the
/// chunk count is `ceil((len - overlap) / (chunk_size - overlap))`.
#[inline]
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Result<Vec<TextChunk>> {
    config.validate()?;

    let chars: Vec<char> = text.chars().collect();
    let step = config.chunk_size - config.overlap;

    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + config.chunk_size).min(chars.len());
        let window: String = chars[start..end].iter().collect();
        let trimmed = window.trim();
        if !trimmed.is_empty() {
            chunks.push(TextChunk {
                text: trimmed.to_string(),
                index: chunks.len(),
            });
        }

        if end >= chars.len() {
            break;
        }
        start += step;
    }

    debug!(
        "Chunked {} chars into {} chunks (size {}, overlap {})",
        chars.len(),
        chunks.len(),
        config.chunk_size,
        config.overlap
    );

    Ok(chunks)
}
