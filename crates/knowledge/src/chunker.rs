//! Text chunking with configurable size and overlap.
//!
//! Splitting is delegated to `text-splitter`, which ends each chunk on the
//! highest semantic boundary that fits (line breaks, then sentences, words,
//! graphemes and finally chars). Lengths and offsets are counted in chars.

use docrag_core::{AppError, AppResult};
use serde::Serialize;
use std::sync::Arc;
use text_splitter::{ChunkConfig as SplitterConfig, TextSplitter};

/// Default maximum chunk length in chars.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default overlap between consecutive chunks in chars.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Validated chunking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    size: usize,
    overlap: usize,
}

impl ChunkConfig {
    /// Create a config; `size` must be positive and `overlap` smaller than `size`.
    pub fn new(size: usize, overlap: usize) -> AppResult<Self> {
        if size == 0 {
            return Err(AppError::Config("Chunk size must be positive".to_string()));
        }
        if overlap >= size {
            return Err(AppError::Config(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                overlap, size
            )));
        }
        Ok(Self { size, overlap })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    fn splitter(&self) -> AppResult<TextSplitter<text_splitter::Characters>> {
        let config = SplitterConfig::new(self.size)
            .with_overlap(self.overlap)
            .map_err(|e| AppError::Config(format!("Invalid chunk overlap: {}", e)))?
            .with_trim(false);
        Ok(TextSplitter::new(config))
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// A contiguous span of the input text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Ordinal within the source text
    pub index: usize,

    /// Char offset of the first char
    pub start: usize,

    /// Char offset one past the last char
    pub end: usize,

    /// Text content
    pub text: String,
}

impl Chunk {
    /// Length in chars.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Split `text` into overlapping chunks.
///
/// The returned iterator is cheap to clone; clone it to walk the sequence again.
pub fn split_text(text: &str, config: &ChunkConfig) -> AppResult<Chunks> {
    let splitter = config.splitter()?;

    // Byte offset of every char, for turning splitter offsets into char offsets
    let char_starts: Vec<usize> = text.char_indices().map(|(byte, _)| byte).collect();
    let to_char = |byte: usize| char_starts.partition_point(|&b| b < byte);

    let mut chunks: Vec<Chunk> = Vec::new();
    for (byte_start, piece) in splitter.chunk_indices(text) {
        let start = to_char(byte_start);
        let end = start + piece.chars().count();

        // A chunk that adds nothing past its predecessor is pure overlap
        if chunks.last().is_some_and(|prev| end <= prev.end) {
            continue;
        }

        chunks.push(Chunk {
            index: chunks.len(),
            start,
            end,
            text: piece.to_string(),
        });
    }

    tracing::trace!(
        "Split {} chars into {} chunks",
        char_starts.len(),
        chunks.len()
    );

    Ok(Chunks {
        chunks: chunks.into(),
        position: 0,
    })
}

/// Iterator over the chunks of one text.
#[derive(Debug, Clone)]
pub struct Chunks {
    chunks: Arc<[Chunk]>,
    position: usize,
}

impl Iterator for Chunks {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        let chunk = self.chunks.get(self.position)?.clone();
        self.position += 1;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.chunks.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Chunks {}
