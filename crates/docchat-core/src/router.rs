//! Intent routing between document questions and call scheduling

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phrases that mark a message as a request to be contacted
pub const DEFAULT_TRIGGERS: &[&str] = &["call me", "contact me", "schedule", "appointment"];

/// Where an incoming message should go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    Scheduling,
    DocumentQuestion,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Scheduling => write!(f, "scheduling"),
            Route::DocumentQuestion => write!(f, "document-question"),
        }
    }
}

/// Classifies a message. Implementations must be pure.
pub trait IntentRouter: Send + Sync {
    fn route(&self, query: &str) -> Route;
}

/// Case-insensitive substring match against a fixed set of trigger phrases
#[derive(Debug, Clone)]
pub struct KeywordRouter {
    triggers: Vec<String>,
}

impl KeywordRouter {
    pub fn new<I, S>(triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let triggers = triggers
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { triggers }
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }
}

impl Default for KeywordRouter {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGERS)
    }
}

impl IntentRouter for KeywordRouter {
    fn route(&self, query: &str) -> Route {
        let query = query.to_lowercase();
        if self.triggers.iter().any(|t| query.contains(t.as_str())) {
            Route::Scheduling
        } else {
            Route::DocumentQuestion
        }
    }
}

/// Route with the default trigger set
pub fn route(query: &str) -> Route {
    KeywordRouter::default().route(query)
}
