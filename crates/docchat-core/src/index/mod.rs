//! Ingestion pipeline
//!
//! Page extraction, overlapping chunking, and embedding into a fresh
//! per-document retrieval index.

mod chunker;
mod loader;
mod pipeline;

pub use chunker::*;
pub use loader::*;
pub use pipeline::*;
