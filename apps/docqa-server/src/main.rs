//! Document question-answering service.
//!
//! Wires the concrete pipeline (hash embedder, LanceDB vector index,
//! Tantivy keyword index, chat-completions client) behind the single
//! `execute` endpoint and serves it.

mod app;
mod error;

use anyhow::Context;
use docqa_core::config::AppConfig;
use docqa_core::traits::Embedder;
use docqa_embed::HashEmbedder;
use docqa_llm::ChatClient;
use docqa_pipeline::file_store::FileStore;
use docqa_pipeline::indexer::EmbeddingIndexer;
use docqa_pipeline::orchestrator::BatchOrchestrator;
use docqa_retrieval::RetrievalClient;
use docqa_text::TantivyKeywordIndex;
use docqa_vector::LanceVectorIndex;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use app::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let state = build_state(&config)?;

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    tracing::info!(%address, collection = %config.index_name(), "server listening");
    axum::serve(listener, app::router(state))
        .await
        .context("serving requests")?;
    Ok(())
}

fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let embedder = Arc::new(HashEmbedder::default());
    let vector = Arc::new(LanceVectorIndex::new(
        config.vector_db_path.clone(),
        embedder.dim(),
    ));
    let keyword = Arc::new(TantivyKeywordIndex::new(config.keyword_index_path.clone()));

    let retriever = Arc::new(RetrievalClient::new(
        Arc::clone(&embedder) as Arc<dyn docqa_core::traits::Embedder>,
        Arc::clone(&vector) as Arc<dyn docqa_core::traits::VectorIndex>,
        Arc::clone(&keyword) as Arc<dyn docqa_core::traits::KeywordIndex>,
        config.hybrid_alpha,
        config.min_distance,
        config.max_documents,
    ));
    let indexer = Arc::new(EmbeddingIndexer::new(embedder, vector, keyword));
    let generator = Arc::new(ChatClient::new(&config.llm).context("building chat client")?);

    let orchestrator = Arc::new(BatchOrchestrator::new(
        indexer,
        retriever,
        generator,
        config.index_name(),
        config.top_k,
        config.search_mode,
        Duration::from_secs(config.llm.request_timeout_secs),
    ));
    let files = Arc::new(FileStore::new(config.download_folder.clone()));
    Ok(AppState { orchestrator, files })
}
