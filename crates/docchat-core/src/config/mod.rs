//! Configuration management

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM service configuration
    #[serde(default)]
    pub llm_service: LLMServiceConfig,

    /// Document loading and chunking
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Retrieval parameters
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Multi-turn conversation behaviour
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// On-disk index placement
    #[serde(default)]
    pub index: IndexConfig,

    /// Intent routing
    #[serde(default)]
    pub router: RouterConfig,
}

/// LLM service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the LLM service for chat/completions
    pub url: String,

    /// Model name for chat completions
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Base URL for embeddings service (can be different from LLM URL)
    #[serde(default)]
    pub embedding_url: Option<String>,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding dimensions (learned from the first response if not specified)
    #[serde(default)]
    pub embedding_dimensions: Option<usize>,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Sampling temperature for answers
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on generated tokens per answer
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl LLMServiceConfig {
    /// Get the embeddings URL (falls back to main URL if not specified)
    pub fn embeddings_url(&self) -> &str {
        self.embedding_url.as_deref().unwrap_or(&self.url)
    }
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("DOCCHAT_LLM_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            model: default_chat_model(),
            embedding_url: std::env::var("DOCCHAT_EMBEDDING_URL").ok(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: std::env::var("DOCCHAT_EMBEDDING_DIMS")
                .ok()
                .and_then(|s| s.parse().ok()),
            api_key: std::env::var("DOCCHAT_LLM_API_KEY").ok(),
            timeout_secs: default_timeout(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_chat_model() -> String {
    std::env::var("DOCCHAT_LLM_MODEL").unwrap_or_else(|_| "llama3.2:3b-instruct-q4_K_M".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("DOCCHAT_EMBEDDING_MODEL").unwrap_or_else(|_| "all-minilm".to_string())
}

fn default_timeout() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    512
}

/// Chunking and embedding parameters used while loading a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Number of chunks sent per embedding request
    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,

    /// Embedding requests in flight at once
    #[serde(default = "default_embed_concurrency")]
    pub embed_concurrency: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            embed_batch_size: default_embed_batch_size(),
            embed_concurrency: default_embed_concurrency(),
        }
    }
}

fn default_chunk_size() -> usize {
    crate::index::CHUNK_SIZE_CHARS
}

fn default_chunk_overlap() -> usize {
    crate::index::CHUNK_OVERLAP_CHARS
}

fn default_embed_batch_size() -> usize {
    32
}

fn default_embed_concurrency() -> usize {
    2
}

/// Retrieval parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks handed to the model per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum cosine similarity for a chunk to count as a source
    #[serde(default)]
    pub min_score: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_score: 0.0,
        }
    }
}

fn default_top_k() -> usize {
    4
}

/// Conversation history handling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Replay at most this many recent turns; `None` replays all of them
    #[serde(default)]
    pub max_history_turns: Option<usize>,

    /// Clear history whenever a new document replaces the current one
    #[serde(default = "default_true")]
    pub reset_history_on_load: bool,

    /// Rewrite follow-up questions into standalone ones before retrieval
    #[serde(default = "default_true")]
    pub condense_question: bool,

    /// Deadline for retrieval plus generation of one answer
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_history_turns: None,
            reset_history_on_load: true,
            condense_question: true,
            query_timeout_secs: default_query_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_query_timeout() -> u64 {
    120
}

/// Where per-document indexes live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Parent directory; each load creates its own subdirectory here
    #[serde(default = "default_index_root")]
    pub root: PathBuf,

    /// Leave index directories on disk once superseded or when the session ends
    #[serde(default)]
    pub keep_previous_indexes: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            root: default_index_root(),
            keep_previous_indexes: false,
        }
    }
}

fn default_index_root() -> PathBuf {
    std::env::var("DOCCHAT_INDEX_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(crate::CACHE_DIR_NAME)
                .join("indexes")
        })
}

/// Trigger phrases for the keyword router
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default = "default_triggers")]
    pub triggers: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            triggers: default_triggers(),
        }
    }
}

fn default_triggers() -> Vec<String> {
    crate::router::DEFAULT_TRIGGERS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from an explicit path, falling back to defaults if absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Reject settings the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        use crate::error::DocChatError;

        if self.ingest.chunk_size == 0 {
            return Err(DocChatError::Config("ingest.chunk_size must be > 0".into()));
        }
        if self.ingest.chunk_overlap >= self.ingest.chunk_size {
            return Err(DocChatError::Config(format!(
                "ingest.chunk_overlap ({}) must be smaller than ingest.chunk_size ({})",
                self.ingest.chunk_overlap, self.ingest.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(DocChatError::Config("retrieval.top_k must be > 0".into()));
        }
        Ok(())
    }
}
