use docqa_core::error::{Error, Result};
use tantivy::schema::{
    IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING,
};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer};
use tantivy::Index;

pub const CONTENT_TOKENIZER: &str = "content_with_stopwords";

pub struct Fields {
    pub id: tantivy::schema::Field,
    pub content: tantivy::schema::Field,
    pub file_path: tantivy::schema::Field,
    pub agent: tantivy::schema::Field,
}

impl Fields {
    pub fn resolve(schema: &Schema) -> Result<Self> {
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|e| Error::Index(format!("keyword schema missing '{name}': {e}")))
        };
        Ok(Self {
            id: field("id")?,
            content: field("content")?,
            file_path: field("file_path")?,
            agent: field("agent")?,
        })
    }
}

pub fn build_schema() -> Schema {
    let mut builder = Schema::builder();
    builder.add_text_field("id", STRING | STORED);
    let content_indexing = TextFieldIndexing::default()
        .set_tokenizer(CONTENT_TOKENIZER)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let content_options = TextOptions::default()
        .set_indexing_options(content_indexing)
        .set_stored();
    builder.add_text_field("content", content_options);
    builder.add_text_field("file_path", STRING | STORED);
    builder.add_text_field("agent", STRING | STORED);
    builder.build()
}

pub fn register_tokenizer(index: &Index) {
    let stop_words = [
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is",
        "it", "its", "of", "on", "that", "the", "to", "was", "will", "with", "or", "but", "not",
        "this", "these", "they", "them", "their", "there", "then", "than", "so", "if", "when",
        "where", "why", "how", "what", "which", "who", "whom", "whose", "can", "could", "should",
        "would", "may", "might", "must", "shall", "do", "does", "did", "have", "had", "having",
    ];
    let tokenizer = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .filter(StopWordFilter::remove(
            stop_words.into_iter().map(|s| s.to_string()),
        ))
        .build();
    index.tokenizers().register(CONTENT_TOKENIZER, tokenizer);
}
