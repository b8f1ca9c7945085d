//! LLM trait definitions

use super::ChatMessage;
use crate::error::Result;
use async_trait::async_trait;

/// Embedding generation trait
///
/// The same implementation (and model) must be used to build an index and
/// to embed the questions asked against it.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for batch of texts, one per input in order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimensions (0 if not known yet)
    fn dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Chat-style text generation
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate the assistant reply for a message sequence
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String>;

    /// Get model name
    fn model_name(&self) -> &str;
}
