//! Collaborator seams. The embedding model, the vector index, the keyword
//! index, and the language model are black boxes behind these traits; the
//! pipeline is written against them and tests substitute in-memory fakes.

use crate::error::Result;
use crate::types::{DocumentChunk, RetrievedMatch, SearchMode};
use async_trait::async_trait;

/// Text → fixed-length vector. Must be the same function instance between
/// index time and query time or retrieval degrades silently.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Nearest-neighbor index service. `query_vector` scores are distances
/// (lower is more similar).
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn collection_exists(&self, collection: &str) -> Result<bool>;
    async fn row_count(&self, collection: &str) -> Result<usize>;
    async fn upsert_chunk(
        &self,
        collection: &str,
        chunk: &DocumentChunk,
        vector: &[f32],
    ) -> Result<()>;
    async fn query_vector(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<RetrievedMatch>>;
    async fn delete_by_ids(&self, collection: &str, ids: &[String]) -> Result<()>;
    async fn delete_collection(&self, collection: &str) -> Result<()>;
}

/// Lexical index feeding the keyword side of hybrid search. Scores are
/// BM25-style (higher is more relevant).
pub trait KeywordIndex: Send + Sync {
    fn add_chunk(&self, collection: &str, chunk: &DocumentChunk) -> Result<()>;
    fn search(&self, collection: &str, query: &str, limit: usize)
        -> Result<Vec<RetrievedMatch>>;
    fn delete_collection(&self, collection: &str) -> Result<()>;
}

/// Top-K retrieval over one collection. Empty query or empty collection
/// yields an empty list, not an error.
#[async_trait]
pub trait ContextRetriever: Send + Sync {
    async fn search(
        &self,
        query: &str,
        collection: &str,
        k: usize,
        mode: SearchMode,
    ) -> Result<Vec<RetrievedMatch>>;
}

/// Question + retrieved context → generated answer. `Ok(None)` means the
/// model returned empty content; an `Err` is a transport-level failure.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, question: &str, context: &str) -> Result<Option<String>>;
}

/// Builds the index for a corpus unless an up-to-date one already exists.
#[async_trait]
pub trait CorpusIndexer: Send + Sync {
    async fn ensure_index(
        &self,
        corpus_path: &std::path::Path,
        collection: &str,
        overwrite: bool,
    ) -> Result<()>;
}
