//! Corpus loading: walks a directory and extracts text page by page.
//!
//! PDF text extraction runs on the blocking pool. Plain `.txt` files are
//! also accepted (single-page documents); everything else is skipped.
//! An unreadable file is logged and skipped rather than failing the
//! whole corpus.

use docqa_core::error::{Error, Result};
use docqa_core::types::Meta;
use std::path::{Path, PathBuf};

/// One page of extracted text, before sanitization and chunking.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub file_name: String,
    pub page: usize,
    pub text: String,
    pub metadata: Meta,
}

#[derive(Default)]
pub struct CorpusLoader;

impl CorpusLoader {
    pub fn new() -> Self {
        Self
    }

    pub async fn load_directory(&self, dir: &Path) -> Result<Vec<LoadedPage>> {
        if !dir.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("corpus directory not found: {}", dir.display()),
            )));
        }
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                matches!(
                    p.extension().and_then(|s| s.to_str()),
                    Some("pdf") | Some("txt")
                )
            })
            .collect();
        files.sort();

        let mut pages = Vec::new();
        for path in files {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            match self.load_file(&path).await {
                Ok(file_pages) => {
                    tracing::info!(file = %file_name, pages = file_pages.len(), "loaded document");
                    pages.extend(file_pages.into_iter().enumerate().map(|(i, text)| {
                        let mut metadata = Meta::new();
                        metadata.insert("page".to_string(), i.to_string());
                        LoadedPage { file_name: file_name.clone(), page: i, text, metadata }
                    }));
                }
                Err(e) => {
                    tracing::warn!(file = %file_name, error = %e, "skipping unreadable document");
                }
            }
        }
        Ok(pages)
    }

    async fn load_file(&self, path: &Path) -> Result<Vec<String>> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("pdf") => {
                let bytes = tokio::fs::read(path).await?;
                let text = tokio::task::spawn_blocking(move || {
                    pdf_extract::extract_text_from_mem(&bytes)
                })
                .await
                .map_err(|e| Error::Index(format!("pdf extraction task: {e}")))?
                .map_err(|e| Error::Index(format!("pdf extraction: {e}")))?;
                // pdftotext-style page separator.
                Ok(text
                    .split('\u{c}')
                    .map(str::to_string)
                    .filter(|p| !p.trim().is_empty())
                    .collect())
            }
            Some("txt") => {
                let text = tokio::fs::read_to_string(path).await?;
                if text.trim().is_empty() {
                    Ok(vec![])
                } else {
                    Ok(vec![text])
                }
            }
            _ => Ok(vec![]),
        }
    }
}
