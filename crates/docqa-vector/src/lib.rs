#![deny(warnings)]
#![deny(unused_imports)]

//! LanceDB-backed nearest-neighbor index client.
//!
//! Every logical operation is one acquire/use/release unit: a connection
//! is opened (with the retry budget), used for the single operation, and
//! dropped on every exit path. No connection is shared across calls.

pub mod retry;
mod schema;

use arrow_array::{Array, Float32Array, RecordBatchIterator, StringArray};
use async_trait::async_trait;
use docqa_core::error::{Error, Result};
use docqa_core::traits::VectorIndex;
use docqa_core::types::{DocumentChunk, Meta, RetrievedMatch};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::Connection;
use std::path::PathBuf;

use retry::{connect_with_retry, CONNECT_ATTEMPTS, CONNECT_DELAY};
use schema::chunk_to_record_batch;

pub struct LanceVectorIndex {
    db_path: PathBuf,
    dim: usize,
}

impl LanceVectorIndex {
    pub fn new(db_path: PathBuf, dim: usize) -> Self {
        Self { db_path, dim }
    }

    async fn client(&self) -> Result<Connection> {
        let uri = self.db_path.to_string_lossy().to_string();
        connect_with_retry(CONNECT_ATTEMPTS, CONNECT_DELAY, || {
            let uri = uri.clone();
            async move { lancedb::connect(&uri).execute().await }
        })
        .await
    }

    async fn table_exists(client: &Connection, collection: &str) -> Result<bool> {
        let names = client
            .table_names()
            .execute()
            .await
            .map_err(|e| Error::Index(format!("list collections: {e}")))?;
        Ok(names.iter().any(|n| n == collection))
    }
}

#[async_trait]
impl VectorIndex for LanceVectorIndex {
    async fn collection_exists(&self, collection: &str) -> Result<bool> {
        let client = self.client().await?;
        Self::table_exists(&client, collection).await
    }

    async fn row_count(&self, collection: &str) -> Result<usize> {
        let client = self.client().await?;
        if !Self::table_exists(&client, collection).await? {
            return Ok(0);
        }
        let table = client
            .open_table(collection)
            .execute()
            .await
            .map_err(|e| Error::Index(format!("open collection '{collection}': {e}")))?;
        table
            .count_rows(None)
            .await
            .map_err(|e| Error::Index(format!("count rows: {e}")))
    }

    async fn upsert_chunk(
        &self,
        collection: &str,
        chunk: &DocumentChunk,
        vector: &[f32],
    ) -> Result<()> {
        let client = self.client().await?;
        let batch = chunk_to_record_batch(chunk, vector, self.dim)?;
        let schema = batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
        if Self::table_exists(&client, collection).await? {
            let table = client
                .open_table(collection)
                .execute()
                .await
                .map_err(|e| Error::Index(format!("open collection '{collection}': {e}")))?;
            table
                .delete(&format!("id = '{}'", escape(&chunk.id)))
                .await
                .map_err(|e| Error::Index(format!("replace chunk '{}': {e}", chunk.id)))?;
            table
                .add(reader)
                .execute()
                .await
                .map_err(|e| Error::Index(format!("insert chunk '{}': {e}", chunk.id)))?;
        } else {
            client
                .create_table(collection, reader)
                .execute()
                .await
                .map_err(|e| Error::Index(format!("create collection '{collection}': {e}")))?;
        }
        Ok(())
    }

    async fn query_vector(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<RetrievedMatch>> {
        let client = self.client().await?;
        if !Self::table_exists(&client, collection).await? {
            return Ok(vec![]);
        }
        let table = client
            .open_table(collection)
            .execute()
            .await
            .map_err(|e| Error::Index(format!("open collection '{collection}': {e}")))?;
        let mut stream = table
            .vector_search(vector.to_vec())
            .map_err(|e| Error::Index(format!("vector search: {e}")))?
            .limit(limit)
            .execute()
            .await
            .map_err(|e| Error::Index(format!("vector search: {e}")))?;

        let mut matches = Vec::new();
        while let Some(batch) = stream
            .try_next()
            .await
            .map_err(|e| Error::Index(format!("vector search stream: {e}")))?
        {
            let ids = string_column(&batch, "id")?;
            let contents = string_column(&batch, "content")?;
            let metadatas = string_column(&batch, "metadata")?;
            let distances = batch
                .column_by_name("_distance")
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>().cloned());
            for i in 0..batch.num_rows() {
                let metadata: Meta =
                    serde_json::from_str(metadatas.value(i)).unwrap_or_default();
                let score = distances.as_ref().map_or(0.0, |d| d.value(i));
                matches.push(RetrievedMatch {
                    id: ids.value(i).to_string(),
                    content: contents.value(i).to_string(),
                    score,
                    metadata,
                });
            }
        }
        // Distances: ascending is most-similar first.
        matches.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(limit);
        Ok(matches)
    }

    async fn delete_by_ids(&self, collection: &str, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Err(Error::Index("no ids provided to delete".into()));
        }
        let client = self.client().await?;
        if !Self::table_exists(&client, collection).await? {
            return Ok(());
        }
        let table = client
            .open_table(collection)
            .execute()
            .await
            .map_err(|e| Error::Index(format!("open collection '{collection}': {e}")))?;
        let quoted: Vec<String> = ids.iter().map(|id| format!("'{}'", escape(id))).collect();
        table
            .delete(&format!("id IN ({})", quoted.join(", ")))
            .await
            .map_err(|e| Error::Index(format!("delete by ids: {e}")))?;
        Ok(())
    }

    async fn delete_collection(&self, collection: &str) -> Result<()> {
        let client = self.client().await?;
        if !Self::table_exists(&client, collection).await? {
            return Ok(());
        }
        client
            .drop_table(collection, &[])
            .await
            .map_err(|e| Error::Index(format!("drop collection '{collection}': {e}")))?;
        Ok(())
    }
}

fn string_column<'a>(
    batch: &'a arrow_array::RecordBatch,
    name: &str,
) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| Error::Index(format!("result batch missing column '{name}'")))
}

fn escape(id: &str) -> String {
    id.replace('\'', "''")
}
