//! Encyclopedic knowledge source used for semantic noise.

mod wikipedia;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use wikipedia::{WikipediaClient, DEFAULT_USER_AGENT};

#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("knowledge request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("knowledge api error: {status} {body}")]
    Api { status: u16, body: String },
}

impl KnowledgeError {
    pub fn is_transient(&self) -> bool {
        match self {
            KnowledgeError::Request(e) => crate::http::is_transient_request(e),
            KnowledgeError::Api { status, .. } => crate::http::is_transient_status(*status),
        }
    }
}

/// A random encyclopedia article. `exists` is false when the source had no page to offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    title: String,
    summary: String,
    exists: bool,
}

impl Article {
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            exists: true,
        }
    }

    pub fn missing(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: String::new(),
            exists: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }
}

#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    async fn random_article(&self) -> Result<Article, KnowledgeError>;
}
