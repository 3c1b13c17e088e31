//! Metadata and text normalization applied before chunking.

use docqa_core::types::{Meta, META_AGENT, META_FILE_PATH};

/// Loader-injected fields that are noise, not domain data.
const NOISE_KEYS: [&str; 4] = ["Creator", "ModDate", "Producer", "CreationDate"];

/// Fixed tag identifying chunks written by this agent.
pub const AGENT_TAG: &str = "Document";

/// Strips loader noise and injects the `agent` and `file_path` tags.
pub fn sanitize_metadata(metadata: &mut Meta, file_path: &str) {
    for key in NOISE_KEYS {
        metadata.remove(key);
    }
    metadata.insert(META_AGENT.to_string(), AGENT_TAG.to_string());
    metadata.insert(META_FILE_PATH.to_string(), file_path.to_string());
}

/// Removes literal `-` and `_` characters from page text before splitting.
/// Downstream consumers expect chunk text in this form; isolated here so
/// it can be dropped in one place.
pub fn normalize_text(text: &str) -> String {
    text.replace(['-', '_'], "")
}
