//! Typed failure values and the client-facing error envelope.
//!
//! "No results" and "empty model content" are not errors anywhere in this
//! workspace; they are `Ok` values the orchestrator handles by dropping
//! the affected question.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generic text returned to clients in place of internal detail.
pub const GENERIC_ERROR: &str =
    "Oops! We could not process your request. Please retry after some time.";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The embedding function is not loaded. Fatal precondition for a
    /// retrieval call, never retried.
    #[error("Embedding model unavailable: {0}")]
    EmbedderUnavailable(String),

    /// Vector-index connection still failing after the retry budget.
    #[error("Index connection failed after {attempts} attempts: {message}")]
    Connection { attempts: u32, message: String },

    /// A vector or keyword index operation failed.
    #[error("Index operation failed: {0}")]
    Index(String),

    /// The language-model call failed (timeout, transport, malformed
    /// response). Distinct from the model returning empty content.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Every question in the batch dropped out.
    #[error("execution failed while formatting the response")]
    EmptyBatch,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Uniform error payload: `message` is internal and logged server-side
/// only, `displayMessage` is the only text a client ever sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemMessage {
    pub code: u16,
    pub message: String,
    #[serde(rename = "displayMessage")]
    pub display_message: String,
}

impl SystemMessage {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), display_message: GENERIC_ERROR.to_string() }
    }
}

impl From<&Error> for SystemMessage {
    fn from(err: &Error) -> Self {
        let code = match err {
            Error::InvalidConfig(_) | Error::EmptyBatch => 400,
            _ => 500,
        };
        Self::new(code, err.to_string())
    }
}
