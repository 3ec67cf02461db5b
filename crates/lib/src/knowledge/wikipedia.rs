//! Wikipedia REST client (https://en.wikipedia.org/api/rest_v1 by default).

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{Article, KnowledgeError, KnowledgeSource};

const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org/api/rest_v1";

/// Wikipedia asks API clients to identify themselves.
pub const DEFAULT_USER_AGENT: &str = "ShrinkMCP (query augmentation)";

#[derive(Clone)]
pub struct WikipediaClient {
    base_url: String,
    client: reqwest::Client,
}

impl WikipediaClient {
    pub fn new(
        base_url: Option<String>,
        user_agent: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, KnowledgeError> {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let user_agent = user_agent.unwrap_or(DEFAULT_USER_AGENT);
        Ok(Self {
            base_url,
            client: crate::http::build_client(timeout, Some(user_agent))?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(rename = "type", default)]
    typ: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    extract: String,
}

#[async_trait]
impl KnowledgeSource for WikipediaClient {
    /// GET /page/random/summary — redirects to the summary of a random page.
    async fn random_article(&self) -> Result<Article, KnowledgeError> {
        let url = format!("{}/page/random/summary", self.base_url);
        let res = self.client.get(&url).send().await?;
        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Article::missing(""));
        }
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(KnowledgeError::Api { status, body });
        }
        let data: SummaryResponse = res.json().await?;
        if data.typ == "no-extract" {
            return Ok(Article::missing(data.title));
        }
        Ok(Article::new(data.title, data.extract))
    }
}
