#![deny(warnings)]
#![deny(unused_imports)]

//! Keyword (lexical) index, the BM25 side of hybrid search.
//!
//! Each collection is a separate Tantivy index directory under a common
//! root, created lazily on first write. Chunk content and metadata are
//! stored so keyword-only hits can be surfaced as full matches.

mod schema;

use docqa_core::error::{Error, Result};
use docqa_core::traits::KeywordIndex;
use docqa_core::types::{DocumentChunk, Meta, RetrievedMatch, META_AGENT, META_FILE_PATH};
use std::path::PathBuf;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::Value;
use tantivy::{doc, Index, TantivyDocument, Term};

use schema::{build_schema, register_tokenizer, Fields};

pub struct TantivyKeywordIndex {
    root: PathBuf,
}

impl TantivyKeywordIndex {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    fn open_or_create(&self, collection: &str) -> Result<(Index, Fields)> {
        let dir = self.collection_dir(collection);
        std::fs::create_dir_all(&dir)?;
        let schema = build_schema();
        let directory = tantivy::directory::MmapDirectory::open(&dir)
            .map_err(|e| Error::Index(format!("open keyword index '{collection}': {e}")))?;
        let index = Index::open_or_create(directory, schema)
            .map_err(|e| Error::Index(format!("open keyword index '{collection}': {e}")))?;
        register_tokenizer(&index);
        let fields = Fields::resolve(&index.schema())?;
        Ok((index, fields))
    }

    fn open_existing(&self, collection: &str) -> Result<Option<(Index, Fields)>> {
        let dir = self.collection_dir(collection);
        if !dir.exists() {
            return Ok(None);
        }
        let index = Index::open_in_dir(&dir)
            .map_err(|e| Error::Index(format!("open keyword index '{collection}': {e}")))?;
        register_tokenizer(&index);
        let fields = Fields::resolve(&index.schema())?;
        Ok(Some((index, fields)))
    }
}

impl KeywordIndex for TantivyKeywordIndex {
    fn add_chunk(&self, collection: &str, chunk: &DocumentChunk) -> Result<()> {
        let (index, fields) = self.open_or_create(collection)?;
        let mut writer = index
            .writer(50_000_000)
            .map_err(|e| Error::Index(format!("keyword index writer: {e}")))?;
        // Upsert semantics: replace any previous revision of the chunk.
        writer.delete_term(Term::from_field_text(fields.id, &chunk.id));
        let file_path = chunk.metadata.get(META_FILE_PATH).cloned().unwrap_or_default();
        let agent = chunk.metadata.get(META_AGENT).cloned().unwrap_or_default();
        writer
            .add_document(doc!(
                fields.id => chunk.id.clone(),
                fields.content => chunk.content.clone(),
                fields.file_path => file_path,
                fields.agent => agent,
            ))
            .map_err(|e| Error::Index(format!("keyword index add: {e}")))?;
        writer
            .commit()
            .map_err(|e| Error::Index(format!("keyword index commit: {e}")))?;
        Ok(())
    }

    fn search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RetrievedMatch>> {
        let Some((index, fields)) = self.open_existing(collection)? else {
            return Ok(vec![]);
        };
        let reader = index
            .reader()
            .map_err(|e| Error::Index(format!("keyword index reader: {e}")))?;
        let searcher = reader.searcher();
        let parser = QueryParser::for_index(&index, vec![fields.content]);
        let parsed = match parser.parse_query(query) {
            Ok(q) => q,
            // A query made entirely of stop words or punctuation parses to
            // nothing; that is a miss, not a failure.
            Err(e) => {
                tracing::debug!(collection, %e, "keyword query did not parse");
                return Ok(vec![]);
            }
        };
        let top_docs = searcher
            .search(&parsed, &TopDocs::with_limit(limit))
            .map_err(|e| Error::Index(format!("keyword search: {e}")))?;
        let mut matches = Vec::with_capacity(top_docs.len());
        for (score, addr) in top_docs {
            let retrieved: TantivyDocument = searcher
                .doc(addr)
                .map_err(|e| Error::Index(format!("keyword doc fetch: {e}")))?;
            let text_of = |field| {
                retrieved
                    .get_first(field)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string()
            };
            let mut metadata = Meta::new();
            metadata.insert(META_FILE_PATH.to_string(), text_of(fields.file_path));
            metadata.insert(META_AGENT.to_string(), text_of(fields.agent));
            matches.push(RetrievedMatch {
                id: text_of(fields.id),
                content: text_of(fields.content),
                score,
                metadata,
            });
        }
        Ok(matches)
    }

    fn delete_collection(&self, collection: &str) -> Result<()> {
        let dir = self.collection_dir(collection);
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }
}
