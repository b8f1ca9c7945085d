//! DocChat Core Library
//!
//! Conversational question answering over a single uploaded PDF.
//!
//! # Features
//! - Page-aware PDF ingestion with overlapping character chunks
//! - Per-document SQLite retrieval index with cosine / HNSW search
//! - Retrieval-augmented answers with multi-turn history
//! - Keyword routing of "call me" requests into a structured intake flow

pub mod config;
pub mod error;
pub mod index;
pub mod intake;
pub mod llm;
pub mod qa;
pub mod router;
pub mod search;
pub mod session;
pub mod store;

pub use config::{Config, LLMServiceConfig};
pub use error::{DocChatError, Error, Result};
pub use index::{
    chunk_by_chars, chunk_pages, ingest_document, Chunk, ChunkMetadata, DocumentLoader,
    IngestOptions, IngestReport, PageText, PdfLoader,
};
pub use intake::{run_intake, FieldValidator, InputProvider, IntakeFlow, IntakeRecord, IntakeStage, IntakeStep};
pub use llm::{ChatMessage, ChatModel, Embedder, HttpEmbedder, HttpLLMClient, MetricsSnapshot};
pub use qa::{Answer, QaEngine, QaOptions, SourceRef, Turn};
pub use router::{route, IntentRouter, KeywordRouter, Route};
pub use search::{RetrievalIndex, SearchHit, SearchOptions};
pub use session::{ChatSession, Reply, ReplyKind, APOLOGY_MESSAGE, NOT_READY_MESSAGE};
pub use store::IndexMeta;

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "docchat";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "docchat";
