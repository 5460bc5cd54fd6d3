// Embeddings module
// Text chunking and the embedding capability used to index chunks and queries

pub mod chunking;

pub use chunking::{Chunk, ChunkingConfig, chunk_documents, split_text};

use crate::Result;

/// Maps text to fixed-length vectors
pub trait Embedder: Send + Sync {
    /// Embed each input text, returning one vector per input in the same order
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    #[inline]
    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| crate::QaError::RemoteService("Empty embedding response".to_string()))
    }
}
