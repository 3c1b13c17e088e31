#![deny(warnings)]
#![deny(unused_imports)]

//! The indexing and answering pipeline: corpus loading, sanitization,
//! chunking, idempotent index construction, upload persistence, and the
//! batch orchestrator that ties retrieval and generation together.

pub mod file_store;
pub mod indexer;
pub mod loader;
pub mod orchestrator;
pub mod sanitize;
pub mod splitter;
