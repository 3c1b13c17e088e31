#![deny(warnings)]
#![deny(unused_imports)]

//! Retrieval client: top-K context lookup over one collection.
//!
//! Pure-vector mode ranks by ascending distance; hybrid mode fuses
//! normalized vector and keyword sub-scores under `alpha`. Score semantics
//! differ per mode and are never mixed within one call path.

pub mod fusion;

use async_trait::async_trait;
use docqa_core::error::{Error, Result};
use docqa_core::traits::{ContextRetriever, Embedder, KeywordIndex, VectorIndex};
use docqa_core::types::{RetrievedMatch, SearchMode};
use std::collections::HashMap;
use std::sync::Arc;

use fusion::relative_score_fusion;

pub struct RetrievalClient {
    embedder: Arc<dyn Embedder>,
    vector: Arc<dyn VectorIndex>,
    keyword: Arc<dyn KeywordIndex>,
    /// Hybrid fusion weight: 1.0 pure vector, 0.0 pure keyword.
    alpha: f32,
    /// Relevance floor on the similarity scale; matches below it are dropped.
    relevance_floor: f32,
    /// Candidate pool size pulled from each index before fusion.
    max_candidates: usize,
}

impl RetrievalClient {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        vector: Arc<dyn VectorIndex>,
        keyword: Arc<dyn KeywordIndex>,
        alpha: f32,
        relevance_floor: f32,
        max_candidates: usize,
    ) -> Self {
        Self { embedder, vector, keyword, alpha, relevance_floor, max_candidates }
    }

    fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        self.embedder
            .embed(query)
            .map_err(|e| Error::EmbedderUnavailable(e.to_string()))
    }

    async fn pure_vector(
        &self,
        query: &str,
        collection: &str,
        k: usize,
    ) -> Result<Vec<RetrievedMatch>> {
        let query_vector = self.embed_query(query)?;
        let mut matches = self.vector.query_vector(collection, &query_vector, k).await?;
        // Scores are distances here; the floor is on the similarity scale.
        matches.retain(|m| 1.0 - m.score >= self.relevance_floor);
        Ok(matches)
    }

    async fn hybrid(
        &self,
        query: &str,
        collection: &str,
        k: usize,
    ) -> Result<Vec<RetrievedMatch>> {
        let query_vector = self.embed_query(query)?;
        let vector_matches = self
            .vector
            .query_vector(collection, &query_vector, self.max_candidates)
            .await?;
        let keyword_matches = self.keyword.search(collection, query, self.max_candidates)?;

        // Both sub-score lists must be "higher is better" before fusion;
        // vector distances convert to similarities first.
        let vector_scored: Vec<(String, f32)> = vector_matches
            .iter()
            .map(|m| (m.id.clone(), 1.0 - m.score))
            .collect();
        let keyword_scored: Vec<(String, f32)> = keyword_matches
            .iter()
            .map(|m| (m.id.clone(), m.score))
            .collect();

        let mut by_id: HashMap<String, RetrievedMatch> = HashMap::new();
        for m in keyword_matches.into_iter().chain(vector_matches.into_iter()) {
            by_id.insert(m.id.clone(), m);
        }

        let fused = relative_score_fusion(&vector_scored, &keyword_scored, self.alpha, k);
        let mut matches = Vec::with_capacity(fused.len());
        for (id, score) in fused {
            if score < self.relevance_floor {
                continue;
            }
            if let Some(mut m) = by_id.remove(&id) {
                m.score = score;
                matches.push(m);
            }
        }
        Ok(matches)
    }
}

#[async_trait]
impl ContextRetriever for RetrievalClient {
    async fn search(
        &self,
        query: &str,
        collection: &str,
        k: usize,
        mode: SearchMode,
    ) -> Result<Vec<RetrievedMatch>> {
        if query.trim().is_empty() || k == 0 {
            return Ok(vec![]);
        }
        let matches = match mode {
            SearchMode::PureVector => self.pure_vector(query, collection, k).await?,
            SearchMode::Hybrid => self.hybrid(query, collection, k).await?,
        };
        if matches.is_empty() {
            tracing::debug!(collection, query, "retrieval produced no matches");
        }
        Ok(matches)
    }
}
