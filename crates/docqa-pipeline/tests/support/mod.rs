//! In-memory fakes for the pipeline's collaborator seams.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use docqa_core::error::{Error, Result};
use docqa_core::traits::{Embedder, KeywordIndex, VectorIndex};
use docqa_core::types::{DocumentChunk, RetrievedMatch};

/// Deterministic embedder that counts every invocation, so tests can
/// verify that idempotent indexing skips re-embedding.
pub struct CountingEmbedder {
    pub calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new() -> Self {
        Self { calls: AtomicUsize::new(0) }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for CountingEmbedder {
    fn dim(&self) -> usize {
        8
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut v = vec![0f32; 8];
        for (i, b) in text.bytes().enumerate() {
            v[(i + b as usize) % 8] += f32::from(b) / 255.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }
}

/// Decrements the open-handle counter on every exit path, mirroring the
/// scoped acquire/use/release contract of the real index client.
struct HandleGuard<'a> {
    open: &'a AtomicUsize,
}

impl<'a> HandleGuard<'a> {
    fn acquire(open: &'a AtomicUsize) -> Self {
        open.fetch_add(1, Ordering::SeqCst);
        Self { open }
    }
}

impl Drop for HandleGuard<'_> {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct MemoryVectorIndex {
    collections: Mutex<HashMap<String, Vec<(DocumentChunk, Vec<f32>)>>>,
    pub open_handles: AtomicUsize,
    pub fail_queries: std::sync::atomic::AtomicBool,
}

impl MemoryVectorIndex {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn open_handle_count(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    1.0 - dot
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn collection_exists(&self, collection: &str) -> Result<bool> {
        let _guard = HandleGuard::acquire(&self.open_handles);
        Ok(self.collections.lock().expect("lock").contains_key(collection))
    }

    async fn row_count(&self, collection: &str) -> Result<usize> {
        let _guard = HandleGuard::acquire(&self.open_handles);
        Ok(self
            .collections
            .lock()
            .expect("lock")
            .get(collection)
            .map_or(0, Vec::len))
    }

    async fn upsert_chunk(
        &self,
        collection: &str,
        chunk: &DocumentChunk,
        vector: &[f32],
    ) -> Result<()> {
        let _guard = HandleGuard::acquire(&self.open_handles);
        let mut collections = self.collections.lock().expect("lock");
        let rows = collections.entry(collection.to_string()).or_default();
        rows.retain(|(c, _)| c.id != chunk.id);
        rows.push((chunk.clone(), vector.to_vec()));
        Ok(())
    }

    async fn query_vector(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<RetrievedMatch>> {
        let _guard = HandleGuard::acquire(&self.open_handles);
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(Error::Index("simulated mid-query failure".into()));
        }
        let collections = self.collections.lock().expect("lock");
        let Some(rows) = collections.get(collection) else {
            return Ok(vec![]);
        };
        let mut matches: Vec<RetrievedMatch> = rows
            .iter()
            .map(|(chunk, stored)| RetrievedMatch {
                id: chunk.id.clone(),
                content: chunk.content.clone(),
                score: cosine_distance(vector, stored),
                metadata: chunk.metadata.clone(),
            })
            .collect();
        matches.sort_by(|a, b| a.score.total_cmp(&b.score));
        matches.truncate(limit);
        Ok(matches)
    }

    async fn delete_by_ids(&self, collection: &str, ids: &[String]) -> Result<()> {
        let _guard = HandleGuard::acquire(&self.open_handles);
        if let Some(rows) = self.collections.lock().expect("lock").get_mut(collection) {
            rows.retain(|(c, _)| !ids.contains(&c.id));
        }
        Ok(())
    }

    async fn delete_collection(&self, collection: &str) -> Result<()> {
        let _guard = HandleGuard::acquire(&self.open_handles);
        self.collections.lock().expect("lock").remove(collection);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryKeywordIndex {
    collections: Mutex<HashMap<String, Vec<DocumentChunk>>>,
}

impl MemoryKeywordIndex {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl KeywordIndex for MemoryKeywordIndex {
    fn add_chunk(&self, collection: &str, chunk: &DocumentChunk) -> Result<()> {
        let mut collections = self.collections.lock().expect("lock");
        let rows = collections.entry(collection.to_string()).or_default();
        rows.retain(|c| c.id != chunk.id);
        rows.push(chunk.clone());
        Ok(())
    }

    fn search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RetrievedMatch>> {
        let collections = self.collections.lock().expect("lock");
        let Some(rows) = collections.get(collection) else {
            return Ok(vec![]);
        };
        let terms: Vec<String> = query
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        let mut matches: Vec<RetrievedMatch> = rows
            .iter()
            .filter_map(|chunk| {
                let content = chunk.content.to_lowercase();
                let overlap = terms.iter().filter(|t| content.contains(*t)).count();
                if overlap == 0 {
                    return None;
                }
                Some(RetrievedMatch {
                    id: chunk.id.clone(),
                    content: chunk.content.clone(),
                    score: overlap as f32,
                    metadata: chunk.metadata.clone(),
                })
            })
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(limit);
        Ok(matches)
    }

    fn delete_collection(&self, collection: &str) -> Result<()> {
        self.collections.lock().expect("lock").remove(collection);
        Ok(())
    }
}
