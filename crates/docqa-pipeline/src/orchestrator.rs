//! Batch orchestration: index once, retrieve per question, generate
//! concurrently, and assemble the final ordered record list.
//!
//! Failure policy, stage by stage: indexing errors are absorbed (the
//! pipeline proceeds with whatever the collection holds), a question
//! whose retrieval or generation yields nothing is dropped from the
//! output, and only an all-empty batch surfaces as an error.

use docqa_core::error::{Error, Result};
use docqa_core::traits::{AnswerGenerator, ContextRetriever, CorpusIndexer};
use docqa_core::types::{QuestionRecord, SearchMode};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Separator between retrieved chunks in the prompt context, in
/// retrieval-rank order.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

pub struct BatchOrchestrator {
    indexer: Arc<dyn CorpusIndexer>,
    retriever: Arc<dyn ContextRetriever>,
    generator: Arc<dyn AnswerGenerator>,
    collection: String,
    top_k: usize,
    mode: SearchMode,
    /// Per-question generation budget; a hung call drops only its own
    /// question instead of stalling the batch.
    generation_timeout: Duration,
}

impl BatchOrchestrator {
    pub fn new(
        indexer: Arc<dyn CorpusIndexer>,
        retriever: Arc<dyn ContextRetriever>,
        generator: Arc<dyn AnswerGenerator>,
        collection: String,
        top_k: usize,
        mode: SearchMode,
        generation_timeout: Duration,
    ) -> Self {
        Self { indexer, retriever, generator, collection, top_k, mode, generation_timeout }
    }

    /// Answers a batch of questions against the corpus. The output is a
    /// strict sub-sequence of the input order: questions may be dropped,
    /// never reordered or duplicated.
    pub async fn answer_batch(
        &self,
        questions: &[String],
        corpus_path: &Path,
        overwrite: bool,
    ) -> Result<Vec<QuestionRecord>> {
        if let Err(e) = self
            .indexer
            .ensure_index(corpus_path, &self.collection, overwrite)
            .await
        {
            // Degraded mode: an unindexed corpus yields empty retrievals,
            // not a hard failure of the whole request.
            tracing::error!(error = %e, "failed while embedding generation");
        }

        let (stubs, contexts) = self.retrieve_all(questions).await;
        let answers = self.generate_all(&stubs, &contexts).await;

        let mut records = Vec::with_capacity(stubs.len());
        for (mut stub, answer) in stubs.into_iter().zip(answers) {
            match answer {
                Some(text) => {
                    stub.answer = text;
                    records.push(stub);
                }
                None => {
                    tracing::info!(question = %stub.question, "empty answer, dropping question");
                }
            }
        }
        if records.is_empty() {
            return Err(Error::EmptyBatch);
        }
        Ok(records)
    }

    /// Sequential retrieval pass. Questions with no usable context get no
    /// stub at all; stubs and contexts stay index-aligned.
    async fn retrieve_all(
        &self,
        questions: &[String],
    ) -> (Vec<QuestionRecord>, Vec<String>) {
        let mut stubs = Vec::new();
        let mut contexts = Vec::new();
        for question in questions {
            match self
                .retriever
                .search(question, &self.collection, self.top_k, self.mode)
                .await
            {
                Ok(documents) if !documents.is_empty() => {
                    let context = documents
                        .iter()
                        .map(|d| d.content.as_str())
                        .collect::<Vec<_>>()
                        .join(CONTEXT_SEPARATOR);
                    stubs.push(QuestionRecord {
                        question: question.clone(),
                        answer: String::new(),
                        documents,
                    });
                    contexts.push(context);
                }
                Ok(_) => {
                    tracing::info!(question, "no relevant documents, dropping question");
                }
                Err(e) => {
                    tracing::warn!(question, error = %e, "retrieval failed, dropping question");
                }
            }
        }
        (stubs, contexts)
    }

    /// Concurrent generation fan-out: every call is scheduled before any
    /// result is awaited, and results correlate back to their stub by
    /// index, never by completion order.
    async fn generate_all(
        &self,
        stubs: &[QuestionRecord],
        contexts: &[String],
    ) -> Vec<Option<String>> {
        let tasks = stubs.iter().zip(contexts.iter()).map(|(stub, context)| {
            let generator = Arc::clone(&self.generator);
            let question = stub.question.clone();
            let context = context.clone();
            let budget = self.generation_timeout;
            async move {
                tokio::time::timeout(budget, generator.generate(&question, &context)).await
            }
        });
        let results = futures::future::join_all(tasks).await;

        results
            .into_iter()
            .zip(stubs)
            .map(|(result, stub)| match result {
                Ok(Ok(answer)) => answer,
                Ok(Err(e)) => {
                    tracing::warn!(question = %stub.question, error = %e, "generation failed, dropping question");
                    None
                }
                Err(_) => {
                    tracing::warn!(question = %stub.question, "generation timed out, dropping question");
                    None
                }
            })
            .collect()
    }
}
