//! Arrow schema and record-batch construction for chunk rows.
//!
//! Chunk metadata is an open mapping, so it is stored as one JSON column
//! rather than a column per key.

use arrow_array::{FixedSizeListArray, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use docqa_core::error::{Error, Result};
use docqa_core::types::DocumentChunk;
use std::sync::Arc;

pub fn build_arrow_schema(dim: usize) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("content", DataType::Utf8, false),
        Field::new("metadata", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                dim as i32,
            ),
            false,
        ),
    ]))
}

pub fn chunk_to_record_batch(
    chunk: &DocumentChunk,
    vector: &[f32],
    dim: usize,
) -> Result<RecordBatch> {
    if vector.len() != dim {
        return Err(Error::Index(format!(
            "embedding has {} dimensions, index expects {dim}",
            vector.len()
        )));
    }
    let metadata_json = serde_json::to_string(&chunk.metadata)
        .map_err(|e| Error::Index(format!("serialize chunk metadata: {e}")))?;
    let vectors: Vec<Option<Vec<Option<f32>>>> =
        vec![Some(vector.iter().copied().map(Some).collect())];
    RecordBatch::try_new(
        build_arrow_schema(dim),
        vec![
            Arc::new(StringArray::from(vec![chunk.id.clone()])),
            Arc::new(StringArray::from(vec![chunk.content.clone()])),
            Arc::new(StringArray::from(vec![metadata_json])),
            Arc::new(FixedSizeListArray::from_iter_primitive::<
                arrow_array::types::Float32Type,
                _,
                _,
            >(vectors.into_iter(), dim as i32)),
        ],
    )
    .map_err(|e| Error::Index(format!("build record batch: {e}")))
}
