//! Upload persistence. `save` reports whether it actually wrote, because
//! "newly written" is the orchestrator's trigger to force re-indexing.

use docqa_core::error::Result;
use std::path::{Path, PathBuf};

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `bytes` under the store root. Returns `true` when the file
    /// was newly written or overwritten, `false` when it already existed
    /// and `overwrite` was not set.
    pub async fn save(&self, file_name: &str, bytes: &[u8], overwrite: bool) -> Result<bool> {
        let location = self.root.join(file_name);
        if location.exists() && !overwrite {
            tracing::info!(file = %location.display(), "file already exists, not overwriting");
            return Ok(false);
        }
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&location, bytes).await?;
        tracing::info!(file = %location.display(), bytes = bytes.len(), "saved uploaded file");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn save_writes_new_file_and_reports_true() {
        let tmp = TempDir::new().expect("tempdir");
        let store = FileStore::new(tmp.path().join("downloads"));
        let written = store.save("a.pdf", b"pdf bytes", false).await.expect("save");
        assert!(written);
        assert!(tmp.path().join("downloads/a.pdf").exists());
    }

    #[tokio::test]
    async fn existing_file_without_overwrite_reports_false() {
        let tmp = TempDir::new().expect("tempdir");
        let store = FileStore::new(tmp.path().to_path_buf());
        store.save("a.pdf", b"first", false).await.expect("save");
        let written = store.save("a.pdf", b"second", false).await.expect("save");
        assert!(!written);
        let content = std::fs::read(tmp.path().join("a.pdf")).expect("read");
        assert_eq!(content, b"first");
    }

    #[tokio::test]
    async fn overwrite_replaces_content_and_reports_true() {
        let tmp = TempDir::new().expect("tempdir");
        let store = FileStore::new(tmp.path().to_path_buf());
        store.save("a.pdf", b"first", false).await.expect("save");
        let written = store.save("a.pdf", b"second", true).await.expect("save");
        assert!(written);
        let content = std::fs::read(tmp.path().join("a.pdf")).expect("read");
        assert_eq!(content, b"second");
    }
}
