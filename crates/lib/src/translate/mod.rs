//! Machine translation abstraction and the Google Translate web client.

mod google;

use async_trait::async_trait;

pub use google::GoogleTranslateClient;

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("translation request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("translation api error: {status} {body}")]
    Api { status: u16, body: String },
    #[error("malformed translation response: {0}")]
    Malformed(String),
}

impl TranslateError {
    /// Network trouble, timeouts, rate limiting and 5xx. Only these are worth a retry.
    pub fn is_transient(&self) -> bool {
        match self {
            TranslateError::Request(e) => crate::http::is_transient_request(e),
            TranslateError::Api { status, .. } => crate::http::is_transient_status(*status),
            TranslateError::Malformed(_) => false,
        }
    }

    /// The service rejected the request itself (bad language code, 4xx other than 429) or it
    /// could not be built. Another language chain will not help. Empty or undecodable
    /// responses are not client errors.
    pub fn is_client_error(&self) -> bool {
        match self {
            TranslateError::Request(e) => e.is_builder(),
            TranslateError::Api { status, .. } => !crate::http::is_transient_status(*status),
            TranslateError::Malformed(_) => false,
        }
    }
}

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_language` (e.g. "fr", "zh-cn", "en").
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslateError>;
}
