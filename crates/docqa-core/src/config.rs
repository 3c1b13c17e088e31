//! Typed configuration loaded once at startup.
//!
//! Uses Figment to merge `config.toml` + `APP_*` env vars into an
//! [`AppConfig`] with explicit defaults, validated at load time. Nested
//! sections map from env vars with a double underscore separator
//! (`APP_LLM__MODEL`, `APP_SERVER__PORT`).

use crate::error::{Error, Result};
use crate::types::SearchMode;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Folder uploaded documents are saved to and indexed from.
    #[serde(default = "default_download_folder")]
    pub download_folder: PathBuf,
    /// LanceDB database location.
    #[serde(default = "default_vector_db_path")]
    pub vector_db_path: PathBuf,
    /// Root directory for per-collection keyword indexes.
    #[serde(default = "default_keyword_index_path")]
    pub keyword_index_path: PathBuf,
    #[serde(default = "default_project")]
    pub project: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Hybrid fusion weight: 1.0 is pure vector, 0.0 pure keyword.
    #[serde(default = "default_hybrid_alpha")]
    pub hybrid_alpha: f32,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Relevance floor on the similarity scale; matches below it are dropped.
    #[serde(default = "default_min_distance")]
    pub min_distance: f32,
    /// Upper bound on candidates pulled from each index during hybrid search.
    #[serde(default = "default_max_documents")]
    pub max_documents: usize,
    /// Retrieval ranking: `pure_vector` (default) or `hybrid`.
    #[serde(default = "default_search_mode")]
    pub search_mode: SearchMode,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,
    #[serde(default = "default_llm_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_download_folder() -> PathBuf {
    PathBuf::from("download_data")
}
fn default_vector_db_path() -> PathBuf {
    PathBuf::from("data_lance")
}
fn default_keyword_index_path() -> PathBuf {
    PathBuf::from("data_keyword")
}
fn default_project() -> String {
    "zania".to_string()
}
fn default_collection() -> String {
    "documents".to_string()
}
fn default_hybrid_alpha() -> f32 {
    0.8
}
fn default_top_k() -> usize {
    2
}
fn default_min_distance() -> f32 {
    0.40
}
fn default_max_documents() -> usize {
    10
}
fn default_search_mode() -> SearchMode {
    SearchMode::PureVector
}
fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_llm_temperature() -> f32 {
    0.0
}
fn default_llm_timeout_secs() -> u64 {
    60
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    9002
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: String::new(),
            model: default_llm_model(),
            temperature: default_llm_temperature(),
            request_timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file("config.toml"))
                .merge(Env::prefixed("APP_").split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.hybrid_alpha) {
            return Err(Error::InvalidConfig(format!(
                "hybrid_alpha must be in [0, 1], got {}",
                self.hybrid_alpha
            )));
        }
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be at least 1".into()));
        }
        if self.max_documents < self.top_k {
            return Err(Error::InvalidConfig(format!(
                "max_documents ({}) must be >= top_k ({})",
                self.max_documents, self.top_k
            )));
        }
        Ok(())
    }

    /// Name of the vector/keyword collection this deployment writes to.
    pub fn index_name(&self) -> String {
        crate::types::index_name(&self.project, &self.collection)
    }
}
