//! Google Translate web endpoint client (https://translate.googleapis.com by default).
//! Uses the keyless `translate_a/single` endpoint, which answers with nested JSON arrays.

use async_trait::async_trait;
use std::time::Duration;

use super::{TranslateError, Translator};

const DEFAULT_BASE_URL: &str = "https://translate.googleapis.com";

/// Client for the Google Translate web endpoint.
#[derive(Clone)]
pub struct GoogleTranslateClient {
    base_url: String,
    client: reqwest::Client,
}

impl GoogleTranslateClient {
    pub fn new(base_url: Option<String>, timeout: Duration) -> Result<Self, TranslateError> {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Self {
            base_url,
            client: crate::http::build_client(timeout, None)?,
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslateClient {
    /// GET /translate_a/single — source language is auto-detected.
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslateError> {
        let url = format!("{}/translate_a/single", self.base_url);
        let res = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_language),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(TranslateError::Api { status, body });
        }
        let data: serde_json::Value = res.json().await?;
        parse_translation(&data)
    }
}

/// The first element is a list of `[translated, original, ...]` segments; join the translations.
fn parse_translation(data: &serde_json::Value) -> Result<String, TranslateError> {
    let segments = data
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| TranslateError::Malformed("missing segment list".to_string()))?;
    let translated: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(|s| s.as_str()))
        .collect();
    if translated.trim().is_empty() {
        return Err(TranslateError::Malformed("no translated text".to_string()));
    }
    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn joins_translated_segments() {
        let data = json!([
            [
                ["Combien font [a] ", "What is [a] ", null, null, 10],
                ["plus [b] ?", "plus [b]?", null, null, 10]
            ],
            null,
            "en"
        ]);
        assert_eq!(parse_translation(&data).unwrap(), "Combien font [a] plus [b] ?");
    }

    #[test]
    fn rejects_unexpected_shapes() {
        assert!(matches!(
            parse_translation(&json!({"error": "nope"})),
            Err(TranslateError::Malformed(_))
        ));
        assert!(matches!(
            parse_translation(&json!([[], null, "en"])),
            Err(TranslateError::Malformed(_))
        ));
    }

    #[test]
    fn base_url_is_trimmed() {
        let c = GoogleTranslateClient::new(
            Some("http://127.0.0.1:9/".to_string()),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(c.base_url, "http://127.0.0.1:9");
    }
}
