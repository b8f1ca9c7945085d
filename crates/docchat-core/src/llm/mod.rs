//! LLM integration
//!
//! Provides traits and implementations for:
//! - Embedding generation via external services (Ollama, vLLM, OpenAI, etc.)
//! - Chat completion for grounded answers

mod cache;
mod client;
mod http_embedder;
mod traits;

pub use cache::{CacheStats, EmbeddingCache};
pub use client::{ChatMessage, HttpLLMClient, MetricsSnapshot};
pub use http_embedder::HttpEmbedder;
pub use traits::*;
