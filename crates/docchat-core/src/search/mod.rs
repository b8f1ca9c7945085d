//! Retrieval index
//!
//! Nearest-neighbour lookup of chunks by embedding similarity:
//! - brute-force cosine ranking for small documents
//! - HNSW (instant-distance) once a document has enough chunks

mod ann_index;
mod vector;

pub use ann_index::{AnnIndex, ANN_THRESHOLD};
pub use vector::rank_by_similarity;

use crate::error::{DocChatError, Result};
use crate::index::Chunk;
use crate::store::{IndexMeta, IndexStore, INDEX_DB_FILE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Search options
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Maximum number of hits
    pub limit: usize,
    /// Minimum cosine similarity
    pub min_score: f32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 4,
            min_score: 0.0,
        }
    }
}

/// A retrieved chunk and how close it was to the query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk: Chunk,
    pub score: f32,
}

/// The (chunk, embedding) pairs of exactly one loaded document
pub struct RetrievalIndex {
    store: IndexStore,
    meta: IndexMeta,
    dir: PathBuf,
    vectors: Vec<(u32, Vec<f32>)>,
    ann: AnnIndex,
}

impl RetrievalIndex {
    /// Create a new index in `dir`, which must not already hold one
    pub fn create(
        dir: &Path,
        meta: IndexMeta,
        chunks: &[Chunk],
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self> {
        let db_path = dir.join(INDEX_DB_FILE);
        if db_path.exists() {
            return Err(DocChatError::Index(format!(
                "Refusing to write into existing index at {}",
                dir.display()
            )));
        }

        let store = IndexStore::open(&db_path)?;
        store.initialize()?;
        store.insert_chunks(chunks, &embeddings)?;
        store.set_meta(&meta)?;

        let vectors: Vec<(u32, Vec<f32>)> = chunks
            .iter()
            .map(|c| c.metadata.seq)
            .zip(embeddings)
            .collect();

        Ok(Self::assemble(store, meta, dir, vectors))
    }

    /// Reopen an index previously written by [`RetrievalIndex::create`]
    pub fn open(dir: &Path) -> Result<Self> {
        let db_path = dir.join(INDEX_DB_FILE);
        if !db_path.is_file() {
            return Err(DocChatError::NotFound(db_path));
        }

        let store = IndexStore::open(&db_path)?;
        store.check_schema()?;
        let meta = store
            .get_meta()?
            .ok_or_else(|| DocChatError::Index("Index has no metadata".to_string()))?;
        let vectors = store.get_all_embeddings()?;

        if vectors.len() != meta.chunk_count {
            return Err(DocChatError::Index(format!(
                "Index at {} is incomplete: {} of {} embeddings",
                dir.display(),
                vectors.len(),
                meta.chunk_count
            )));
        }

        Ok(Self::assemble(store, meta, dir, vectors))
    }

    fn assemble(
        store: IndexStore,
        meta: IndexMeta,
        dir: &Path,
        vectors: Vec<(u32, Vec<f32>)>,
    ) -> Self {
        let ann = AnnIndex::build(&vectors, ANN_THRESHOLD);
        Self {
            store,
            meta,
            dir: dir.to_path_buf(),
            vectors,
            ann,
        }
    }

    /// Top chunks for a query embedding, best first
    pub fn search(&self, query: &[f32], options: &SearchOptions) -> Result<Vec<SearchHit>> {
        if query.len() != self.meta.dimensions {
            return Err(DocChatError::Index(format!(
                "Query embedding has {} dimensions, index has {}",
                query.len(),
                self.meta.dimensions
            )));
        }

        let ranked = if self.ann.is_built() {
            self.ann.search(query, options.limit)
        } else {
            rank_by_similarity(query, &self.vectors, options.limit)
        };

        let mut hits = Vec::with_capacity(ranked.len());
        for (seq, score) in ranked {
            if score < options.min_score {
                continue;
            }
            match self.store.get_chunk(seq)? {
                Some(chunk) => hits.push(SearchHit { chunk, score }),
                None => tracing::warn!("Embedding {} has no chunk row", seq),
            }
        }

        Ok(hits)
    }

    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    /// Directory holding the index files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// All chunks in document order
    pub fn chunks(&self) -> Result<Vec<Chunk>> {
        self.store.get_all_chunks()
    }
}
