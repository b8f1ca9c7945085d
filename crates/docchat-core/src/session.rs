//! Chatbot session: one loaded document, its conversation, and at most one
//! in-progress intake flow

use crate::config::Config;
use crate::error::{DocChatError, Result};
use crate::index::{discard_index_dir, ingest_document, DocumentLoader, IngestOptions, IngestReport, PdfLoader};
use crate::intake::{FieldValidator, IntakeFlow, IntakeRecord, IntakeStep};
use crate::llm::{ChatModel, Embedder, HttpEmbedder, HttpLLMClient};
use crate::qa::{Answer, QaEngine, QaOptions, SourceRef, Turn};
use crate::router::{IntentRouter, KeywordRouter, Route};
use crate::search::RetrievalIndex;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Reply when a question arrives before any document is loaded
pub const NOT_READY_MESSAGE: &str = "No document is loaded. Please upload a document first.";

/// Reply when answering fails
pub const APOLOGY_MESSAGE: &str =
    "I apologize, but I encountered an error processing your request.";

/// What kind of reply the session produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Answer,
    IntakePrompt,
    IntakeComplete,
    NotReady,
    Apology,
}

/// Reply to one user message
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub text: String,
    pub kind: ReplyKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intake: Option<IntakeRecord>,
}

impl Reply {
    fn text(kind: ReplyKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
            sources: Vec::new(),
            intake: None,
        }
    }
}

/// A single user's conversation with one document at a time
pub struct ChatSession {
    config: Config,
    loader: Arc<dyn DocumentLoader>,
    embedder: Arc<dyn Embedder>,
    engine: QaEngine,
    router: Box<dyn IntentRouter>,
    index: Option<RetrievalIndex>,
    /// Whether `index` was built by this session and may be discarded
    index_owned: bool,
    history: Vec<Turn>,
    intake: Option<IntakeFlow>,
    validator: FieldValidator,
}

impl ChatSession {
    /// Create a session over explicit backends
    pub fn new(config: Config, embedder: Arc<dyn Embedder>, chat: Arc<dyn ChatModel>) -> Result<Self> {
        config.validate()?;

        let engine = QaEngine::new(embedder.clone(), chat, QaOptions::from(&config));
        let router = Box::new(KeywordRouter::new(&config.router.triggers));

        Ok(Self {
            config,
            loader: Arc::new(PdfLoader::new()),
            embedder,
            engine,
            router,
            index: None,
            index_owned: false,
            history: Vec::new(),
            intake: None,
            validator: FieldValidator::default(),
        })
    }

    /// Create a session talking to the configured HTTP LLM service
    pub fn from_config(config: Config) -> Result<Self> {
        let client = Arc::new(HttpLLMClient::new(config.llm_service.clone())?);
        let embedder = Arc::new(HttpEmbedder::new(client.clone()));
        Self::new(config, embedder, client)
    }

    pub fn with_loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_router(mut self, router: Box<dyn IntentRouter>) -> Self {
        self.router = router;
        self
    }

    pub fn with_validator(mut self, validator: FieldValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ingest the document at `path` into a fresh index and make it current.
    ///
    /// On failure the previously loaded document, if any, stays active.
    pub async fn load_document(&mut self, path: impl AsRef<Path>) -> Result<IngestReport> {
        let path = path.as_ref();
        let options = IngestOptions::from(&self.config.ingest);

        let (index, report) = ingest_document(
            path,
            self.loader.as_ref(),
            self.embedder.as_ref(),
            &self.config.index.root,
            &options,
        )
        .await
        .map_err(|e| {
            tracing::warn!("Loading {:?} failed: {}", path, e);
            e.into_ingest()
        })?;

        self.install_index(index, true);
        Ok(report)
    }

    /// Make a previously built index current without re-ingesting
    pub fn attach_index(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let index = RetrievalIndex::open(dir.as_ref())?;
        if index.meta().embedding_model != self.embedder.model_name() {
            return Err(DocChatError::Index(format!(
                "Index at {} was built with '{}', session embeds with '{}'",
                dir.as_ref().display(),
                index.meta().embedding_model,
                self.embedder.model_name()
            )));
        }
        self.install_index(index, false);
        Ok(())
    }

    fn install_index(&mut self, index: RetrievalIndex, owned: bool) {
        tracing::info!(
            "Active document is now {} ({} chunks)",
            index.meta().source,
            index.len()
        );

        self.release_index();
        self.index = Some(index);
        self.index_owned = owned;

        if self.config.conversation.reset_history_on_load {
            self.history.clear();
        }
    }

    /// Close the current index, removing its directory when this session
    /// built it and superseded indexes are not kept
    fn release_index(&mut self) {
        let owned = std::mem::take(&mut self.index_owned);
        if let Some(old) = self.index.take() {
            let old_dir = old.dir().to_path_buf();
            drop(old);
            if owned && !self.config.index.keep_previous_indexes {
                discard_index_dir(&old_dir);
            }
        }
    }

    /// Keep the current index on disk after this session ends
    pub fn persist_index(&mut self) -> Option<&Path> {
        self.index_owned = false;
        self.index.as_ref().map(RetrievalIndex::dir)
    }

    /// Where a message would be sent, without acting on it
    pub fn route(&self, message: &str) -> Route {
        self.router.route(message)
    }

    /// Handle one user message and always produce a reply
    pub async fn respond(&mut self, message: &str) -> Reply {
        if let Some(flow) = self.intake.take() {
            return self.continue_intake(flow, message);
        }

        let route = self.route(message);
        tracing::debug!("Routed message to {}", route);

        match route {
            Route::Scheduling => {
                let flow = IntakeFlow::with_validator(self.validator.clone());
                let prompt = flow.prompt();
                self.intake = Some(flow);
                Reply::text(ReplyKind::IntakePrompt, prompt)
            }
            Route::DocumentQuestion => match self.query(message).await {
                Ok(answer) => Reply {
                    text: answer.text,
                    kind: ReplyKind::Answer,
                    sources: answer.sources,
                    intake: None,
                },
                Err(DocChatError::NotReady(reason)) => {
                    tracing::debug!("Not ready: {}", reason);
                    let text = if self.index.is_none() {
                        NOT_READY_MESSAGE.to_string()
                    } else {
                        reason
                    };
                    Reply::text(ReplyKind::NotReady, text)
                }
                Err(e) => {
                    tracing::error!("Answering failed: {}", e);
                    Reply::text(ReplyKind::Apology, APOLOGY_MESSAGE)
                }
            },
        }
    }

    /// Reply text for one user message
    pub async fn ask(&mut self, message: &str) -> String {
        self.respond(message).await.text
    }

    /// Answer a document question, recording the turn only on success
    pub async fn query(&mut self, question: &str) -> Result<Answer> {
        let index = self
            .index
            .as_ref()
            .ok_or_else(|| DocChatError::NotReady(NOT_READY_MESSAGE.to_string()))?;

        let timeout_secs = self.config.conversation.query_timeout_secs;
        let answer = match tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            self.engine.answer(index, question, &self.history),
        )
        .await
        {
            Ok(result) => result.map_err(DocChatError::into_query)?,
            Err(_) => {
                return Err(DocChatError::GenerationFailure(format!(
                    "No answer within {}s",
                    timeout_secs
                )))
            }
        };

        self.history.push(Turn {
            question: question.to_string(),
            answer: answer.text.clone(),
        });
        Ok(answer)
    }

    fn continue_intake(&mut self, mut flow: IntakeFlow, message: &str) -> Reply {
        match flow.submit(message) {
            IntakeStep::Next { prompt, .. } => {
                self.intake = Some(flow);
                Reply::text(ReplyKind::IntakePrompt, prompt)
            }
            IntakeStep::Retry { message, .. } => {
                self.intake = Some(flow);
                Reply::text(ReplyKind::IntakePrompt, message)
            }
            IntakeStep::Complete(record) => {
                tracing::info!("Intake completed for {}", record.email);
                Reply {
                    text: record.confirmation_message(),
                    kind: ReplyKind::IntakeComplete,
                    sources: Vec::new(),
                    intake: Some(record),
                }
            }
        }
    }

    /// Drop an in-progress intake; returns whether one was running
    pub fn cancel_intake(&mut self) -> bool {
        self.intake.take().is_some()
    }

    pub fn intake_in_progress(&self) -> bool {
        self.intake.is_some()
    }

    /// Completed turns for the current document, oldest first
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    pub fn index(&self) -> Option<&RetrievalIndex> {
        self.index.as_ref()
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.release_index();
    }
}
