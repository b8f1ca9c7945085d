//! HTTP client for OpenAI-compatible LLM services (Ollama, vLLM, OpenAI, etc.)

use super::cache::EmbeddingCache;
use super::ChatModel;
use crate::config::LLMServiceConfig;
use crate::error::{DocChatError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Chat message for completion requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// API metrics for monitoring
#[derive(Debug, Default)]
struct ApiMetrics {
    total_requests: AtomicU64,
    total_errors: AtomicU64,
    cache_hits: AtomicU64,
    total_latency_ms: AtomicU64,
}

/// Snapshot of API metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    pub cache_hits: u64,
    pub avg_latency_ms: f64,
}

/// Client for the `/v1/chat/completions` and `/v1/embeddings` endpoints
pub struct HttpLLMClient {
    http_client: reqwest::Client,
    config: LLMServiceConfig,
    embedding_dimensions: AtomicUsize,
    cache: EmbeddingCache,
    metrics: ApiMetrics,
}

impl HttpLLMClient {
    /// Create new client from configuration
    pub fn new(config: LLMServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let embedding_dimensions = AtomicUsize::new(config.embedding_dimensions.unwrap_or(0));

        Ok(Self {
            http_client,
            config,
            embedding_dimensions,
            cache: EmbeddingCache::new(),
            metrics: ApiMetrics::default(),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(LLMServiceConfig::default())
    }

    pub fn config(&self) -> &LLMServiceConfig {
        &self.config
    }

    /// Get current API metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        let total = self.metrics.total_requests.load(Ordering::Relaxed);
        MetricsSnapshot {
            total_requests: total,
            total_errors: self.metrics.total_errors.load(Ordering::Relaxed),
            cache_hits: self.metrics.cache_hits.load(Ordering::Relaxed),
            avg_latency_ms: if total > 0 {
                self.metrics.total_latency_ms.load(Ordering::Relaxed) as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    /// Embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.config.embedding_model
    }

    /// Dimensions seen so far (configured or learned from the first response)
    pub fn embedding_dimensions(&self) -> usize {
        self.embedding_dimensions.load(Ordering::Relaxed)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.api_key {
            Some(ref api_key) => req.header("Authorization", format!("Bearer {}", api_key)),
            None => req,
        }
    }

    fn record_error(&self) {
        self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
    }

    fn record_latency(&self, start: Instant) {
        let elapsed = start.elapsed().as_millis() as u64;
        self.metrics
            .total_latency_ms
            .fetch_add(elapsed, Ordering::Relaxed);
    }

    /// Embed texts, serving repeats from the cache
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let model = self.config.embedding_model.as_str();

        let mut results: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut uncached_texts = Vec::new();
        let mut uncached_indices = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            match self.cache.get(model, text) {
                Some(embedding) => {
                    self.metrics.cache_hits.fetch_add(1, Ordering::Relaxed);
                    results.push(Some(embedding));
                }
                None => {
                    results.push(None);
                    uncached_texts.push(text.clone());
                    uncached_indices.push(i);
                }
            }
        }

        if !uncached_texts.is_empty() {
            tracing::debug!(
                "Embedding batch: {} cached, {} to fetch",
                texts.len() - uncached_texts.len(),
                uncached_texts.len()
            );

            let fetched = self.request_embeddings(&uncached_texts).await?;
            for ((idx, text), embedding) in uncached_indices
                .into_iter()
                .zip(uncached_texts.iter())
                .zip(fetched)
            {
                self.cache.insert(model, text, embedding.clone());
                results[idx] = Some(embedding);
            }
        }

        results
            .into_iter()
            .map(|r| r.ok_or_else(|| DocChatError::Llm("Missing embedding in response".to_string())))
            .collect()
    }

    async fn request_embeddings(&self, input: &[String]) -> Result<Vec<Vec<f32>>> {
        #[derive(Serialize)]
        struct EmbedRequest<'a> {
            model: &'a str,
            input: &'a [String],
        }

        #[derive(Deserialize)]
        struct EmbedResponse {
            data: Vec<EmbedData>,
        }

        #[derive(Deserialize)]
        struct EmbedData {
            #[serde(default)]
            index: Option<usize>,
            embedding: Vec<f32>,
        }

        let start = Instant::now();
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        let url = format!("{}/v1/embeddings", self.config.embeddings_url());
        let request = EmbedRequest {
            model: &self.config.embedding_model,
            input,
        };

        let response = self
            .authorize(self.http_client.post(&url).json(&request))
            .send()
            .await
            .inspect_err(|_| self.record_error())?;

        if !response.status().is_success() {
            self.record_error();
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DocChatError::ExternalError(format!(
                "Embedding service error (HTTP {}): {}",
                status, body
            )));
        }

        let mut parsed: EmbedResponse = response
            .json()
            .await
            .inspect_err(|_| self.record_error())?;
        self.record_latency(start);

        if parsed.data.len() != input.len() {
            self.record_error();
            return Err(DocChatError::Llm(format!(
                "Embedding service returned {} vectors for {} inputs",
                parsed.data.len(),
                input.len()
            )));
        }

        // Some servers do not preserve order; honor the index field when present
        parsed
            .data
            .sort_by_key(|d| d.index.unwrap_or(usize::MAX));
        let embeddings: Vec<Vec<f32>> = parsed.data.into_iter().map(|d| d.embedding).collect();

        if let Some(first) = embeddings.first() {
            let dims = first.len();
            let known = self.embedding_dimensions.load(Ordering::Relaxed);
            if known == 0 {
                self.embedding_dimensions.store(dims, Ordering::Relaxed);
            } else if known != dims {
                return Err(DocChatError::Llm(format!(
                    "Embedding model {} returned {} dimensions, expected {}",
                    self.config.embedding_model, dims, known
                )));
            }
        }

        Ok(embeddings)
    }
}

#[async_trait]
impl ChatModel for HttpLLMClient {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
        #[derive(Serialize)]
        struct ChatRequest {
            model: String,
            messages: Vec<ChatMessage>,
            temperature: f32,
            max_tokens: u32,
            stream: bool,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatMessage,
        }

        let start = Instant::now();
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream: false,
        };

        let url = format!("{}/v1/chat/completions", self.config.url);

        let response = self
            .authorize(self.http_client.post(&url).json(&request))
            .send()
            .await
            .inspect_err(|_| self.record_error())?;

        if !response.status().is_success() {
            self.record_error();
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DocChatError::ExternalError(format!(
                "LLM service error (HTTP {}): {}",
                status, body
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .inspect_err(|_| self.record_error())?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| {
                self.record_error();
                DocChatError::Llm("No response from LLM".to_string())
            })?
            .message
            .content;

        self.record_latency(start);
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
