
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::Result;
use crate::config::ConfigError;
use crate::ingest::{Document, DocumentSource};

/// Represents a chunk of document text ready for embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The chunk text
    pub text: String,
    /// Source of the parent document
    pub source: DocumentSource,
    /// The index of this chunk within its parent document
    pub chunk_index: usize,
}

/// Configuration for text chunking. Sizes are measured in characters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk length
    pub chunk_size: usize,
    /// Characters shared between adjacent chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 50,
        }
    }
}

impl ChunkingConfig {
    #[inline]
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(self.chunk_size));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::OverlapTooLarge(
                self.chunk_overlap,
                self.chunk_size,
            ));
        }

        Ok(())
    }

    /// Distance between the starts of two adjacent windows
    #[inline]
    pub fn stride(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }
}

/// Split every document into overlapping chunks, keeping document order
#[inline]
pub fn chunk_documents(documents: &[Document], config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    config.validate()?;

    info!(
        "Splitting documents into chunks of size {} with overlap {}",
        config.chunk_size, config.chunk_overlap
    );

    let mut chunks = Vec::new();
    for document in documents {
        let pieces = split_text(&document.text, config)?;
        debug!("Split {} into {} chunks", document.source, pieces.len());

        // Whitespace-only windows carry nothing to embed
        chunks.extend(
            pieces
                .into_iter()
                .enumerate()
                .filter(|(_, text)| !text.trim().is_empty())
                .map(|(chunk_index, text)| Chunk {
                    text,
                    source: document.source.clone(),
                    chunk_index,
                }),
        );
    }

    info!(
        "Created {} chunks from {} documents",
        chunks.len(),
        documents.len()
    );
    Ok(chunks)
}

/// Slide a `chunk_size` window over `text`, advancing by `chunk_size - chunk_overlap`.
///
/// Text shorter than the window comes back as a single chunk. Empty text
/// yields no chunks.
#[inline]
pub fn split_text(text: &str, config: &ChunkingConfig) -> Result<Vec<String>> {
    config.validate()?;

    if text.is_empty() {
        return Ok(Vec::new());
    }

    // Byte offset of every char boundary, including the end of the text
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_count = boundaries.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + config.chunk_size).min(char_count);
        chunks.push(text[boundaries[start]..boundaries[end]].to_string());

        if end == char_count {
            break;
        }
        start += config.stride();
    }

    Ok(chunks)
}
