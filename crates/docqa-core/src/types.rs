//! Domain types shared by the indexing and answering pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type ChunkId = String;
pub type Meta = BTreeMap<String, String>;

/// Metadata key tagging every chunk with the agent that produced it.
pub const META_AGENT: &str = "agent";
/// Metadata key carrying the source grouping for a chunk.
pub const META_FILE_PATH: &str = "file_path";

/// A bounded slice of a source document, the unit of embedding and retrieval.
///
/// `metadata` always carries `agent` and `file_path`; loader-injected noise
/// fields are stripped before a chunk is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: ChunkId,
    pub content: String,
    pub metadata: Meta,
}

/// Which ranking the retrieval client should use.
///
/// Scores mean different things per mode and are never mixed in one call
/// path: `PureVector` ranks by ascending distance, `Hybrid` by descending
/// fused relevance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    PureVector,
    Hybrid,
}

/// One retrieved chunk with its ranking score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedMatch {
    pub id: ChunkId,
    pub content: String,
    pub score: f32,
    pub metadata: Meta,
}

/// The per-question output record. Emitted only fully formed: a question
/// that yields no context or no answer is dropped, never half-filled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub answer: String,
    pub documents: Vec<RetrievedMatch>,
}

/// Index names are lower-cased concatenations of the project and
/// collection identifiers.
pub fn index_name(project: &str, collection: &str) -> String {
    format!("{}_{}", project.to_lowercase(), collection.to_lowercase())
}
