//! Idempotent index construction.
//!
//! Embeddings are the expensive part of this system. `ensure_index` skips
//! all work when the collection already exists and nothing forces a
//! rebuild; only an explicit override or a newly saved upload re-embeds.

use async_trait::async_trait;
use docqa_core::error::Result;
use docqa_core::traits::{CorpusIndexer, Embedder, KeywordIndex, VectorIndex};
use docqa_core::types::DocumentChunk;
use std::path::Path;
use std::sync::Arc;

use crate::loader::CorpusLoader;
use crate::sanitize::{normalize_text, sanitize_metadata};
use crate::splitter::{split_text, CHUNK_OVERLAP, CHUNK_SIZE};

pub struct EmbeddingIndexer {
    loader: CorpusLoader,
    embedder: Arc<dyn Embedder>,
    vector: Arc<dyn VectorIndex>,
    keyword: Arc<dyn KeywordIndex>,
}

impl EmbeddingIndexer {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        vector: Arc<dyn VectorIndex>,
        keyword: Arc<dyn KeywordIndex>,
    ) -> Self {
        Self { loader: CorpusLoader::new(), embedder, vector, keyword }
    }

    async fn build_chunks(&self, corpus_path: &Path) -> Result<Vec<DocumentChunk>> {
        let pages = self.loader.load_directory(corpus_path).await?;
        let mut chunks = Vec::new();
        for page in pages {
            let text = normalize_text(&page.text);
            let mut metadata = page.metadata;
            sanitize_metadata(&mut metadata, &page.file_name);
            for (i, content) in
                split_text(&text, CHUNK_SIZE, CHUNK_OVERLAP).into_iter().enumerate()
            {
                // Deterministic ids so a rebuild replaces rows instead of
                // duplicating them.
                let id = format!("{}:{}:{}", page.file_name, page.page, i);
                chunks.push(DocumentChunk { id, content, metadata: metadata.clone() });
            }
        }
        Ok(chunks)
    }
}

#[async_trait]
impl CorpusIndexer for EmbeddingIndexer {
    async fn ensure_index(
        &self,
        corpus_path: &Path,
        collection: &str,
        overwrite: bool,
    ) -> Result<()> {
        if !overwrite && self.vector.collection_exists(collection).await? {
            tracing::info!(collection, "embeddings already exist, no update done");
            return Ok(());
        }

        let chunks = self.build_chunks(corpus_path).await?;
        tracing::info!(collection, chunks = chunks.len(), "indexing corpus");
        // Chunk-by-chunk upsert: each insertion is atomic on its own; a
        // failure partway through leaves prior insertions in place.
        for chunk in &chunks {
            let vector = self.embedder.embed(&chunk.content)?;
            self.vector.upsert_chunk(collection, chunk, &vector).await?;
            self.keyword.add_chunk(collection, chunk)?;
        }
        let rows = self.vector.row_count(collection).await?;
        tracing::info!(collection, rows, "indexing complete");
        Ok(())
    }
}
