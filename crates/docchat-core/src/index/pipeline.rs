//! Ingestion pipeline: load → chunk → embed → fresh retrieval index

use super::chunker::{chunk_pages, Chunk};
use super::loader::DocumentLoader;
use crate::config::IngestConfig;
use crate::error::{DocChatError, Result};
use crate::llm::Embedder;
use crate::search::RetrievalIndex;
use crate::store::{hash_content, IndexMeta};
use chrono::Utc;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Chunking and embedding parameters
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub batch_size: usize,
    pub concurrency: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self::from(&IngestConfig::default())
    }
}

impl From<&IngestConfig> for IngestOptions {
    fn from(config: &IngestConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            batch_size: config.embed_batch_size.max(1),
            concurrency: config.embed_concurrency.max(1),
        }
    }
}

/// Outcome of a successful load
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub source: PathBuf,
    pub index_dir: PathBuf,
    pub pages: usize,
    pub chunks: usize,
    pub dimensions: usize,
    pub embedding_model: String,
    pub elapsed_ms: u64,
}

/// Build a fresh, isolated retrieval index for the document at `path`.
///
/// The index is written to a new subdirectory of `index_root`; nothing that
/// already exists there is read or modified.
pub async fn ingest_document(
    path: &Path,
    loader: &dyn DocumentLoader,
    embedder: &dyn Embedder,
    index_root: &Path,
    options: &IngestOptions,
) -> Result<(RetrievalIndex, IngestReport)> {
    let start = Instant::now();

    if !path.is_file() {
        return Err(DocChatError::NotFound(path.to_path_buf()));
    }

    tracing::info!("Loading {} document {:?}", loader.loader_type(), path);
    let pages = loader.load_pages(path).await?;

    let source = path.to_string_lossy().to_string();
    let chunks = chunk_pages(&pages, &source, options.chunk_size, options.chunk_overlap);
    if chunks.is_empty() {
        return Err(DocChatError::EmptyDocument(path.to_path_buf()));
    }
    tracing::info!("Split {} pages into {} chunks", pages.len(), chunks.len());

    let embeddings = embed_chunks(&chunks, embedder, options).await?;
    let dimensions = embeddings.first().map(Vec::len).unwrap_or(0);

    let full_text: String = pages.iter().map(|p| p.text.as_str()).collect();
    let content_hash = hash_content(&full_text);
    let index_dir = fresh_index_dir(index_root, &content_hash)?;

    let meta = IndexMeta {
        source: source.clone(),
        content_hash,
        embedding_model: embedder.model_name().to_string(),
        dimensions,
        page_count: pages.len(),
        chunk_count: chunks.len(),
        created_at: Utc::now(),
    };

    let index = match RetrievalIndex::create(&index_dir, meta, &chunks, embeddings) {
        Ok(index) => index,
        Err(e) => {
            discard_index_dir(&index_dir);
            return Err(e);
        }
    };

    let report = IngestReport {
        source: path.to_path_buf(),
        index_dir,
        pages: pages.len(),
        chunks: chunks.len(),
        dimensions,
        embedding_model: embedder.model_name().to_string(),
        elapsed_ms: start.elapsed().as_millis() as u64,
    };

    tracing::info!(
        "Indexed {:?}: {} chunks, {} dims, {} ms",
        path,
        report.chunks,
        report.dimensions,
        report.elapsed_ms
    );

    Ok((index, report))
}

/// Embed chunk texts in order, a few batches in flight at a time
async fn embed_chunks(
    chunks: &[Chunk],
    embedder: &dyn Embedder,
    options: &IngestOptions,
) -> Result<Vec<Vec<f32>>> {
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let total_batches = texts.len().div_ceil(options.batch_size);

    let batches: Vec<Vec<Vec<f32>>> = stream::iter(texts.chunks(options.batch_size).enumerate())
        .map(|(idx, batch)| async move {
            tracing::debug!("Embedding batch {}/{}", idx + 1, total_batches);
            embedder.embed_batch(batch).await
        })
        .buffered(options.concurrency)
        .try_collect()
        .await?;

    let embeddings: Vec<Vec<f32>> = batches.into_iter().flatten().collect();

    if embeddings.len() != chunks.len() {
        return Err(DocChatError::IngestFailure(format!(
            "Embedder returned {} vectors for {} chunks",
            embeddings.len(),
            chunks.len()
        )));
    }

    let dims = embeddings[0].len();
    if dims == 0 || embeddings.iter().any(|e| e.len() != dims) {
        return Err(DocChatError::IngestFailure(
            "Embedder returned vectors of inconsistent dimensions".to_string(),
        ));
    }

    Ok(embeddings)
}

/// Pick a directory name no earlier load has used
fn fresh_index_dir(root: &Path, content_hash: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(root)?;

    let stamp = Utc::now().format("%Y%m%dT%H%M%S%3f");
    let base = format!("{}-{}", &content_hash[..12.min(content_hash.len())], stamp);

    let mut candidate = root.join(&base);
    let mut n = 1;
    while candidate.exists() {
        candidate = root.join(format!("{}-{}", base, n));
        n += 1;
    }
    std::fs::create_dir_all(&candidate)?;
    Ok(candidate)
}

/// Remove an index directory, logging instead of failing
pub fn discard_index_dir(dir: &Path) {
    if let Err(e) = std::fs::remove_dir_all(dir) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Could not remove index directory {:?}: {}", dir, e);
        }
    } else {
        tracing::debug!("Removed index directory {:?}", dir);
    }
}
