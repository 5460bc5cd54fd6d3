//! Question answering over the document index
//!
//! [`QaService`] owns the vector index together with the embedding and
//! completion capabilities. It is built once at startup and shared by handle
//! with whatever serves queries.

pub mod prompt;


use std::path::Path;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::embeddings::{Chunk, ChunkingConfig, Embedder, chunk_documents};
use crate::index::{SearchResult, VectorIndex};
use crate::ingest::load_directory;
use crate::{QaError, Result};

pub use prompt::build_prompt;

/// Answer returned when nothing has been indexed
pub const NO_CONTEXT_ANSWER: &str =
    "No context available: no documents have been indexed, so this question cannot be answered.";

/// Generates text from a prompt
pub trait CompletionModel: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// The synthesized answer and the chunks it was based on
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerResult {
    pub text: String,
    pub sources: Vec<SearchResult>,
    /// False when no context was available and the model was not consulted
    pub used_context: bool,
}

impl AnswerResult {
    #[inline]
    pub fn no_context() -> Self {
        Self {
            text: NO_CONTEXT_ANSWER.to_string(),
            sources: Vec::new(),
            used_context: false,
        }
    }
}

pub struct QaService {
    index: VectorIndex,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn CompletionModel>,
    top_k: usize,
}

impl QaService {
    #[inline]
    pub fn new(
        index: VectorIndex,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn CompletionModel>,
        top_k: usize,
    ) -> Self {
        Self {
            index,
            embedder,
            llm,
            top_k: top_k.max(1),
        }
    }

    /// Run the startup pipeline using the directory, chunking and retrieval settings from `config`
    #[inline]
    pub fn from_config(
        config: &Config,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn CompletionModel>,
    ) -> Result<Self> {
        Self::from_documents_dir(
            &config.documents.directory,
            &config.chunking,
            config.openai.batch_size as usize,
            embedder,
            llm,
            config.retrieval.top_k,
        )
    }

    /// Load, chunk and embed every document in `directory`, then build the index
    #[inline]
    pub fn from_documents_dir(
        directory: &Path,
        chunking: &ChunkingConfig,
        embed_batch_size: usize,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn CompletionModel>,
        top_k: usize,
    ) -> Result<Self> {
        info!("Initializing QA service with directory: {}", directory.display());
        chunking.validate()?;

        let documents = load_directory(directory)?;
        let chunks = chunk_documents(&documents, chunking)?;
        let index = build_index(chunks, embedder.as_ref(), embed_batch_size)?;

        warn!("Index is held in memory only and will be rebuilt on the next start");
        Ok(Self::new(index, embedder, llm, top_k))
    }

    #[inline]
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    #[inline]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Answer a natural-language question from the indexed documents
    #[inline]
    pub fn answer(&self, query: &str) -> Result<AnswerResult> {
        let query = query.trim();
        if query.is_empty() {
            return Err(QaError::Validation("Query must not be empty".to_string()));
        }

        info!("Retrieving answer for query: {}", query);

        if self.index.is_empty() {
            warn!("Index is empty, answering without context");
            return Ok(AnswerResult::no_context());
        }

        let query_vector = self.embedder.embed_one(query)?;
        let matches = self.retrieve(&query_vector)?;
        info!("Retrieved {} matching chunks", matches.len());

        if matches.is_empty() {
            return Ok(AnswerResult::no_context());
        }

        let prompt = build_prompt(query, &matches);
        match self.llm.complete(&prompt) {
            Ok(text) => {
                info!("Answer retrieved successfully");
                Ok(AnswerResult {
                    text: text.trim().to_string(),
                    sources: matches,
                    used_context: true,
                })
            }
            Err(e) => {
                error!("Completion failed: {}", e);
                Err(e)
            }
        }
    }

    fn retrieve(&self, query_vector: &[f32]) -> Result<Vec<SearchResult>> {
        info!("Retrieving top {} chunks", self.top_k);
        self.index.search(query_vector, self.top_k)
    }
}

/// Embed chunks in batches and pair them with their vectors
fn build_index(chunks: Vec<Chunk>, embedder: &dyn Embedder, batch_size: usize) -> Result<VectorIndex> {
    info!("Creating vector index from {} chunks", chunks.len());

    let bar = if console::user_attended_stderr() {
        ProgressBar::new(chunks.len() as u64).with_style(
            ProgressStyle::with_template("{spinner} [{pos}/{len}] Embedding chunks")
                .map_err(|e| QaError::Other(e.into()))?,
        )
    } else {
        ProgressBar::hidden()
    };

    let mut embeddings = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder.embed(&texts)?;
        if vectors.len() != texts.len() {
            return Err(QaError::RemoteService(format!(
                "Embedder returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            )));
        }
        embeddings.extend(vectors);
        bar.inc(batch.len() as u64);
    }
    bar.finish_and_clear();

    VectorIndex::build(chunks, embeddings)
}
