//! Back-translation: paraphrase by translating through random intermediate languages and
//! back to English, keeping the result only if every placeholder survived the trip.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Arc;

use super::params::AugmentationParams;
use super::tokenizer::{placeholders, preserves_placeholders};
use super::{Augmentor, Technique, MAX_ATTEMPTS};
use crate::translate::{TranslateError, Translator};

/// Intermediate languages a hop may pick from.
pub const SUPPORTED_LANGUAGES: [&str; 30] = [
    "fr", "de", "es", "it", "pt", "ru", "ja", "ko", "zh-cn", "zh-tw", "ar", "hi", "tr", "nl", "sv",
    "pl", "uk", "el", "id", "vi", "th", "ms", "cs", "ro", "hu", "fi", "no", "da", "bg", "sr",
];

const SOURCE_LANGUAGE: &str = "en";

pub struct BackTranslationAugmentor {
    hops: usize,
    translator: Arc<dyn Translator>,
}

impl BackTranslationAugmentor {
    pub fn new(params: &AugmentationParams, translator: Arc<dyn Translator>) -> Self {
        Self {
            hops: params.hops.max(1),
            translator,
        }
    }

    /// Up to [`MAX_ATTEMPTS`] round trips, each with a fresh language chain. Returns the first
    /// result that keeps all placeholders, or `text` unchanged when none does.
    pub async fn back_translate(&self, text: &str, rng: &mut StdRng) -> String {
        let expected = placeholders(text);
        for attempt in 1..=MAX_ATTEMPTS {
            match self.round_trip(text, rng).await {
                Ok(back) if !back.trim().is_empty() && preserves_placeholders(&expected, &back) => {
                    return back;
                }
                Ok(back) => {
                    log::debug!(
                        "back translation attempt {}: placeholders lost in {:?}",
                        attempt,
                        back
                    );
                }
                Err(e) if e.is_client_error() => {
                    log::error!("back translation aborted, keeping query unchanged: {}", e);
                    return text.to_string();
                }
                Err(e) if e.is_transient() => {
                    log::debug!("back translation attempt {}: {}", attempt, e);
                }
                Err(e) => {
                    log::warn!("back translation attempt {}: {}", attempt, e);
                }
            }
        }
        log::warn!(
            "back translation: no valid paraphrase after {} attempts, keeping query unchanged",
            MAX_ATTEMPTS
        );
        text.to_string()
    }

    async fn round_trip(&self, text: &str, rng: &mut StdRng) -> Result<String, TranslateError> {
        let mut current = text.to_string();
        for _ in 0..self.hops {
            let lang = SUPPORTED_LANGUAGES[rng.gen_range(0..SUPPORTED_LANGUAGES.len())];
            current = self.translator.translate(&current, lang).await?;
        }
        self.translator.translate(&current, SOURCE_LANGUAGE).await
    }
}

#[async_trait]
impl Augmentor for BackTranslationAugmentor {
    fn technique(&self) -> Technique {
        Technique::BackTranslation
    }

    async fn augment(&self, text: &str, rng: &mut StdRng) -> String {
        self.back_translate(text, rng).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::augment::params::PartialAugmentationParams;
    use rand::SeedableRng;
    use std::sync::Mutex;

    /// Records every call; answers with `respond(text, target, call_index)`.
    struct FakeTranslator<F> {
        calls: Mutex<Vec<(String, String)>>,
        respond: F,
    }

    impl<F> FakeTranslator<F>
    where
        F: Fn(&str, &str, usize) -> Result<String, TranslateError> + Send + Sync,
    {
        fn new(respond: F) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                respond,
            })
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl<F> Translator for FakeTranslator<F>
    where
        F: Fn(&str, &str, usize) -> Result<String, TranslateError> + Send + Sync,
    {
        async fn translate(&self, text: &str, target: &str) -> Result<String, TranslateError> {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push((text.to_string(), target.to_string()));
                calls.len() - 1
            };
            (self.respond)(text, target, index)
        }
    }

    fn unavailable() -> TranslateError {
        TranslateError::Api {
            status: 503,
            body: "unavailable".to_string(),
        }
    }

    fn augmentor(hops: usize, translator: Arc<dyn Translator>) -> BackTranslationAugmentor {
        let params = AugmentationParams::merged(Some(&PartialAugmentationParams {
            hops: Some(hops),
            ..Default::default()
        }));
        BackTranslationAugmentor::new(&params, translator)
    }

    #[tokio::test]
    async fn always_failing_service_returns_input() {
        let fake = FakeTranslator::new(|_, _, _| Err(unavailable()));
        let aug = augmentor(2, fake.clone());
        let mut rng = StdRng::seed_from_u64(1);
        let text = "What is [a] plus [b]?";
        assert_eq!(aug.back_translate(text, &mut rng).await, text);
        // Each attempt stops at its first failing hop.
        assert_eq!(fake.calls().len(), MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn successful_round_trip_uses_hops_then_english() {
        let fake = FakeTranslator::new(|text: &str, target: &str, _| {
            Ok(if target == "en" {
                text.replace("What is", "How much is")
            } else {
                text.to_string()
            })
        });
        let aug = augmentor(3, fake.clone());
        let mut rng = StdRng::seed_from_u64(42);
        let out = aug.back_translate("What is [a] plus [b]?", &mut rng).await;
        assert_eq!(out, "How much is [a] plus [b]?");

        let calls = fake.calls();
        assert_eq!(calls.len(), 4);
        for (_, lang) in &calls[..3] {
            assert!(SUPPORTED_LANGUAGES.contains(&lang.as_str()), "{lang}");
        }
        assert_eq!(calls[3].1, "en");
    }

    #[tokio::test]
    async fn lost_placeholder_triggers_retry() {
        // The first two round trips drop [b]; the third keeps it.
        let fake = FakeTranslator::new(|text: &str, target: &str, index| {
            if target != "en" {
                return Ok(text.to_string());
            }
            if index < 4 {
                Ok(text.replace("[b]", "b"))
            } else {
                Ok(format!("Tell me: {text}"))
            }
        });
        let aug = augmentor(1, fake.clone());
        let mut rng = StdRng::seed_from_u64(7);
        let out = aug.back_translate("What is [a] plus [b]?", &mut rng).await;
        assert_eq!(out, "Tell me: What is [a] plus [b]?");
        assert_eq!(fake.calls().len(), 6);
    }

    #[tokio::test]
    async fn placeholders_never_preserved_falls_back() {
        let fake = FakeTranslator::new(|text: &str, _, _| Ok(text.replace('[', "(")));
        let aug = augmentor(2, fake.clone());
        let mut rng = StdRng::seed_from_u64(3);
        let text = "Convert [amount] to [currency]";
        assert_eq!(aug.back_translate(text, &mut rng).await, text);
        assert_eq!(fake.calls().len(), MAX_ATTEMPTS * 3);
    }

    #[tokio::test]
    async fn rejected_request_aborts_immediately() {
        let fake = FakeTranslator::new(|_, _, _| {
            Err(TranslateError::Api {
                status: 400,
                body: "bad language".to_string(),
            })
        });
        let aug = augmentor(2, fake.clone());
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(aug.back_translate("Find [x]", &mut rng).await, "Find [x]");
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test]
    async fn malformed_response_consumes_one_attempt() {
        let fake = FakeTranslator::new(|text: &str, target: &str, index| {
            if index == 0 {
                Err(TranslateError::Malformed("no translated text".to_string()))
            } else if target == "en" {
                Ok(text.replace("Find", "Locate"))
            } else {
                Ok(text.to_string())
            }
        });
        let aug = augmentor(2, fake.clone());
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(aug.back_translate("Find [x]", &mut rng).await, "Locate [x]");
        assert_eq!(fake.calls().len(), 4);
    }

    #[tokio::test]
    async fn failing_return_leg_is_retried() {
        let fake = FakeTranslator::new(|text: &str, target: &str, index| {
            if target == "en" && index == 1 {
                Err(unavailable())
            } else {
                Ok(text.to_string())
            }
        });
        let aug = augmentor(1, fake.clone());
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(aug.back_translate("Find [x] now", &mut rng).await, "Find [x] now");
        assert_eq!(fake.calls().len(), 4);
    }

    #[tokio::test]
    async fn language_chain_is_reproducible() {
        let run = |seed| async move {
            let fake = FakeTranslator::new(|text: &str, _, _| Ok(text.to_string()));
            let aug = augmentor(2, fake.clone());
            let mut rng = StdRng::seed_from_u64(seed);
            aug.back_translate("Find [x]", &mut rng).await;
            fake.calls()
        };
        assert_eq!(run(5).await, run(5).await);
    }
}
