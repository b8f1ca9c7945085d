//! Error types for docchat

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using DocChatError
pub type Result<T> = std::result::Result<T, DocChatError>;

/// Error type alias for convenience
pub type Error = DocChatError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for docchat
#[derive(Debug, Error)]
pub enum DocChatError {
    #[error("Document not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("No text content extracted from {}", .0.display())]
    EmptyDocument(PathBuf),

    #[error("Failed to ingest document: {0}")]
    IngestFailure(String),

    #[error("Not ready: {0}")]
    NotReady(String),

    #[error("Generation failed: {0}")]
    GenerationFailure(String),

    #[error("Invalid {field}: {message}")]
    ValidationRejected {
        field: &'static str,
        message: String,
    },

    #[error("Intake aborted before completion")]
    IntakeAborted,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External service error: {0}")]
    ExternalError(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl DocChatError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound(_) => exit_codes::NOT_FOUND,
            Self::EmptyDocument(_) | Self::ValidationRejected { .. } | Self::Config(_) => {
                exit_codes::INVALID_INPUT
            }
            _ => exit_codes::GENERAL_ERROR,
        }
    }

    /// Fold an arbitrary failure during a load into the ingestion taxonomy.
    ///
    /// `NotFound` and `EmptyDocument` pass through; everything else becomes
    /// `IngestFailure` carrying the original message.
    pub fn into_ingest(self) -> Self {
        match self {
            Self::NotFound(_) | Self::EmptyDocument(_) | Self::IngestFailure(_) => self,
            other => Self::IngestFailure(other.to_string()),
        }
    }

    /// Fold a failure while answering into `NotReady` or `GenerationFailure`.
    pub fn into_query(self) -> Self {
        match self {
            Self::NotReady(_) | Self::GenerationFailure(_) => self,
            other => Self::GenerationFailure(other.to_string()),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::ValidationRejected {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_ingest_keeps_taxonomy() {
        let err = DocChatError::NotFound(PathBuf::from("/nope.pdf")).into_ingest();
        assert!(matches!(err, DocChatError::NotFound(_)));

        let err = DocChatError::Llm("connection refused".to_string()).into_ingest();
        match err {
            DocChatError::IngestFailure(msg) => assert!(msg.contains("connection refused")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_into_query() {
        let err = DocChatError::ExternalError("HTTP 500".to_string());
        assert!(matches!(err.into_query(), DocChatError::GenerationFailure(_)));
        let err = DocChatError::NotReady("no document".to_string()).into_query();
        assert!(matches!(err, DocChatError::NotReady(_)));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            DocChatError::NotFound(PathBuf::from("x")).exit_code(),
            exit_codes::NOT_FOUND
        );
        assert_eq!(
            DocChatError::EmptyDocument(PathBuf::from("x")).exit_code(),
            exit_codes::INVALID_INPUT
        );
        assert_eq!(
            DocChatError::IngestFailure("boom".to_string()).exit_code(),
            exit_codes::GENERAL_ERROR
        );
    }
}
