//! Document loaders that turn a file into per-page text

use crate::error::{DocChatError, Result};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};

/// Extracted text of a single page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-based page number
    pub number: u32,
    pub text: String,
}

impl PageText {
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// Something that can extract page text from a file on disk
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Short identifier, e.g. "pdf"
    fn loader_type(&self) -> &'static str;

    /// Extract the text of every page, in page order
    async fn load_pages(&self, path: &Path) -> Result<Vec<PageText>>;
}

/// Loader for PDF files backed by `pdf-extract`
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }

    fn extract_pages(path: &Path) -> Result<Vec<PageText>> {
        let bytes = fs::read(path).map_err(|e| {
            DocChatError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read PDF file {:?}: {}", path, e),
            ))
        })?;

        let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| {
            DocChatError::Parse(format!("Failed to extract text from PDF {:?}: {}", path, e))
        })?;

        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageText::new(i as u32 + 1, text))
            .collect())
    }
}

#[async_trait]
impl DocumentLoader for PdfLoader {
    fn loader_type(&self) -> &'static str {
        "pdf"
    }

    async fn load_pages(&self, path: &Path) -> Result<Vec<PageText>> {
        let owned: PathBuf = path.to_path_buf();
        // pdf-extract is CPU bound and may panic on malformed files
        let pages = tokio::task::spawn_blocking(move || Self::extract_pages(&owned))
            .await
            .map_err(|e| {
                DocChatError::Parse(format!("PDF extraction aborted for {:?}: {}", path, e))
            })??;

        let with_text = pages.iter().filter(|p| !p.text.trim().is_empty()).count();
        tracing::debug!(
            "Extracted {} pages ({} with text) from {:?}",
            pages.len(),
            with_text,
            path
        );
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pdf_loader_rejects_non_pdf_bytes() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("notes.pdf");
        fs::write(&path, "this is plain text, not a PDF").unwrap();

        let result = PdfLoader::new().load_pages(&path).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_pdf_loader_missing_file_is_io_error() {
        let result = PdfLoader::new()
            .load_pages(Path::new("/definitely/not/here.pdf"))
            .await;
        assert!(matches!(result, Err(DocChatError::Io(_))));
    }

    #[test]
    fn test_loader_type() {
        assert_eq!(PdfLoader::new().loader_type(), "pdf");
    }
}
