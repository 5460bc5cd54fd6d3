
use std::cmp::Ordering;

use tracing::{debug, info};

use crate::embeddings::Chunk;
use crate::{QaError, Result};

/// In-memory exact nearest-neighbour index over chunk embeddings
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimension: Option<usize>,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// Search result from vector similarity search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub similarity: f32,
    pub distance: f32,
}

impl VectorIndex {
    /// Build an index from chunks and their embeddings, paired by position
    #[inline]
    pub fn build(chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(QaError::Config(format!(
                "Cannot build index from {} chunks and {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let dimension = embeddings.first().map(Vec::len);
        if let Some(dim) = dimension {
            if dim == 0 {
                return Err(QaError::Config(
                    "Cannot index zero-dimensional vectors".to_string(),
                ));
            }
            if let Some(bad) = embeddings.iter().position(|v| v.len() != dim) {
                return Err(QaError::Config(format!(
                    "Vector {} has {} dimensions, expected {}",
                    bad,
                    embeddings[bad].len(),
                    dim
                )));
            }
        }

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, vector)| IndexEntry { chunk, vector })
            .collect();

        info!(
            "Vector index built with {} chunks ({} dimensions)",
            entries.len(),
            dimension.unwrap_or(0)
        );

        Ok(Self { entries, dimension })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Return up to `k` chunks ordered by descending cosine similarity.
    ///
    /// Equal scores keep insertion order, so repeated searches are stable.
    #[inline]
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(dim) = self.dimension {
            if query.len() != dim {
                return Err(QaError::RemoteService(format!(
                    "Query vector has {} dimensions, index has {}",
                    query.len(),
                    dim
                )));
            }
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, cosine_similarity(query, &entry.vector)))
            .collect();

        // Stable sort: ties stay in insertion order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        debug!(
            "Vector search returned {} of {} chunks",
            scored.len(),
            self.entries.len()
        );

        Ok(scored
            .into_iter()
            .map(|(position, similarity)| SearchResult {
                chunk: self.entries[position].chunk.clone(),
                similarity,
                distance: 1.0 - similarity,
            })
            .collect())
    }
}

/// Cosine similarity between two vectors; zero-norm vectors score 0
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if similarity.is_nan() { 0.0 } else { similarity }
}
