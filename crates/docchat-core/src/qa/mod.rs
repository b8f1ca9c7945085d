//! Retrieval-augmented question answering over a loaded document
//!
//! One call to [`QaEngine::answer`] is one turn:
//! 1. optionally condense the follow-up into a standalone question
//! 2. embed it and retrieve the closest chunks
//! 3. ask the chat model, replaying prior turns as context

mod prompt;

pub use prompt::{answer_messages, clean_standalone, condense_messages};

use crate::config::Config;
use crate::error::{DocChatError, Result};
use crate::llm::{ChatModel, Embedder};
use crate::search::{RetrievalIndex, SearchHit, SearchOptions};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Characters of chunk text kept in a source excerpt
const EXCERPT_CHARS: usize = 200;

/// One completed question/answer exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}

/// Provenance of a chunk used to answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    pub seq: u32,
    pub page: u32,
    pub score: f32,
    pub excerpt: String,
}

impl From<&SearchHit> for SourceRef {
    fn from(hit: &SearchHit) -> Self {
        let text = hit.chunk.text.trim();
        let excerpt = match text.char_indices().nth(EXCERPT_CHARS) {
            Some((idx, _)) => format!("{}...", &text[..idx]),
            None => text.to_string(),
        };
        Self {
            seq: hit.chunk.metadata.seq,
            page: hit.chunk.metadata.page,
            score: hit.score,
            excerpt,
        }
    }
}

/// A generated answer and what it was grounded on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<SourceRef>,
    /// Rewritten question used for retrieval, when condensing happened
    pub standalone_question: Option<String>,
}

#[derive(Debug, Clone)]
pub struct QaOptions {
    pub top_k: usize,
    pub min_score: f32,
    pub condense_question: bool,
    pub max_history_turns: Option<usize>,
}

impl Default for QaOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for QaOptions {
    fn from(config: &Config) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            min_score: config.retrieval.min_score,
            condense_question: config.conversation.condense_question,
            max_history_turns: config.conversation.max_history_turns,
        }
    }
}

/// Answers questions against a retrieval index with conversation context
pub struct QaEngine {
    embedder: Arc<dyn Embedder>,
    chat: Arc<dyn ChatModel>,
    options: QaOptions,
}

impl QaEngine {
    pub fn new(embedder: Arc<dyn Embedder>, chat: Arc<dyn ChatModel>, options: QaOptions) -> Self {
        Self {
            embedder,
            chat,
            options,
        }
    }

    pub fn options(&self) -> &QaOptions {
        &self.options
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Answer `question` from `index`, given the turns so far (oldest first)
    pub async fn answer(
        &self,
        index: &RetrievalIndex,
        question: &str,
        history: &[Turn],
    ) -> Result<Answer> {
        let index_model = &index.meta().embedding_model;
        if index_model != self.embedder.model_name() {
            return Err(DocChatError::NotReady(format!(
                "Index was built with embedding model '{}' but '{}' is configured; reload the document",
                index_model,
                self.embedder.model_name()
            )));
        }

        let history = self.history_window(history);

        let standalone_question = if self.options.condense_question && !history.is_empty() {
            self.condense(question, history).await
        } else {
            None
        };
        let retrieval_query = standalone_question.as_deref().unwrap_or(question);

        let query_embedding = self.embedder.embed(retrieval_query).await?;
        let hits = index.search(
            &query_embedding,
            &SearchOptions {
                limit: self.options.top_k,
                min_score: self.options.min_score,
            },
        )?;
        tracing::debug!("Retrieved {} chunks for {:?}", hits.len(), retrieval_query);

        let messages = answer_messages(question, &hits, history);
        let response = self.chat.chat_completion(messages).await?;
        let text = response.trim().to_string();
        if text.is_empty() {
            return Err(DocChatError::GenerationFailure(
                "Model returned an empty answer".to_string(),
            ));
        }

        Ok(Answer {
            text,
            sources: hits.iter().map(SourceRef::from).collect(),
            standalone_question,
        })
    }

    fn history_window<'a>(&self, history: &'a [Turn]) -> &'a [Turn] {
        match self.options.max_history_turns {
            Some(max) if history.len() > max => &history[history.len() - max..],
            _ => history,
        }
    }

    /// Rewrite a follow-up question; falls back to the raw question on failure
    async fn condense(&self, question: &str, history: &[Turn]) -> Option<String> {
        match self
            .chat
            .chat_completion(condense_messages(question, history))
            .await
        {
            Ok(response) => {
                let standalone = clean_standalone(&response);
                if standalone.is_empty() {
                    None
                } else {
                    tracing::debug!("Condensed {:?} to {:?}", question, standalone);
                    Some(standalone)
                }
            }
            Err(e) => {
                tracing::warn!("Question condensing failed, retrieving with raw question: {}", e);
                None
            }
        }
    }
}
