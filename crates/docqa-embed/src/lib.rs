//! Default embedding function.
//!
//! The embedding model is a black box behind [`Embedder`]; what matters to
//! the pipeline is purity: identical text must produce an identical vector
//! at index time and query time. The default implementation is a
//! deterministic feature-hashing embedder: each whitespace token hashes to
//! a bucket, the accumulated vector is L2-normalized. It is cheap, has no
//! external weights to load, and keeps cosine geometry sensible for
//! overlapping vocabularies.

use docqa_core::error::Result;
use docqa_core::traits::Embedder;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

pub const DEFAULT_DIM: usize = 384;

pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIM)
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0f32; self.dim];
        for token in text.split_whitespace() {
            let token = token.to_lowercase();
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            // Derive a stable weight from the upper hash bits so distinct
            // tokens landing in one bucket do not cancel out.
            let weight = (((h >> 32) as u32) as f32) / (u32::MAX as f32) + 0.5;
            v[idx] += weight;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }
}
