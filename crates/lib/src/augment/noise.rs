//! Noise injection: lexical noise (keyboard typos, swapped letters) and semantic noise
//! (an unrelated encyclopedia sentence prepended to the query).

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::sync::Arc;

use super::keyboard;
use super::params::AugmentationParams;
use super::tokenizer::{detokenize, tokenize, Token, TokenKind};
use super::{Augmentor, Technique, MAX_ATTEMPTS};
use crate::knowledge::KnowledgeSource;

/// Words shorter than this are left alone by character-level noise.
const MIN_WORD_CHARS: usize = 4;

pub struct NoiseAugmentor {
    params: AugmentationParams,
    knowledge: Arc<dyn KnowledgeSource>,
}

impl NoiseAugmentor {
    pub fn new(params: AugmentationParams, knowledge: Arc<dyn KnowledgeSource>) -> Self {
        Self { params, knowledge }
    }

    /// Lexical noise first, then semantic noise; either can be switched off.
    pub async fn augment_with(
        &self,
        text: &str,
        add_lexical: bool,
        add_semantic: bool,
        rng: &mut StdRng,
    ) -> String {
        let mut out = text.to_string();
        if add_lexical {
            out = self.lexical_noise(&out, rng);
        }
        if add_semantic {
            out = self.semantic_noise(&out, rng).await;
        }
        out
    }

    pub fn lexical_noise(&self, text: &str, rng: &mut StdRng) -> String {
        let typed = self.keyboard_typos(text, rng);
        self.swap_letters(&typed, rng)
    }

    /// Replace characters with a neighbouring QWERTY key.
    pub fn keyboard_typos(&self, text: &str, rng: &mut StdRng) -> String {
        self.edit_words(text, rng, |chars, n, rng| {
            let positions: Vec<usize> = (0..chars.len())
                .filter(|&i| !keyboard::neighbours(chars[i]).is_empty())
                .collect();
            let chosen: Vec<usize> = positions.choose_multiple(rng, n).copied().collect();
            let mut changed = false;
            for i in chosen {
                if let Some(c) = keyboard::typo(chars[i], rng) {
                    chars[i] = c;
                    changed = true;
                }
            }
            changed
        })
    }

    /// Swap characters with their right-hand neighbour.
    pub fn swap_letters(&self, text: &str, rng: &mut StdRng) -> String {
        self.edit_words(text, rng, |chars, n, rng| {
            let positions: Vec<usize> = (0..chars.len().saturating_sub(1)).collect();
            let chosen: Vec<usize> = positions.choose_multiple(rng, n).copied().collect();
            let mut changed = false;
            for i in chosen {
                if chars[i] != chars[i + 1] {
                    chars.swap(i, i + 1);
                    changed = true;
                }
            }
            changed
        })
    }

    /// Pick words eligible for character noise and run `edit` on each one's characters.
    /// `edit` gets the number of characters to touch and reports whether it changed anything.
    fn edit_words<F>(&self, text: &str, rng: &mut StdRng, mut edit: F) -> String
    where
        F: FnMut(&mut Vec<char>, usize, &mut StdRng) -> bool,
    {
        let mut tokens = tokenize(text);
        let total = tokens.iter().filter(|t| t.is_content()).count();
        let eligible: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| self.is_noisy_word(t))
            .map(|(i, _)| i)
            .collect();
        let count = self.params.word_count(total, eligible.len());
        let chosen: Vec<usize> = eligible.choose_multiple(rng, count).copied().collect();

        let mut changed = false;
        for idx in chosen {
            let mut chars: Vec<char> = tokens[idx].text.chars().collect();
            let n = self.params.char_count(chars.len());
            if edit(&mut chars, n, rng) {
                tokens[idx].text = chars.into_iter().collect();
                changed = true;
            }
        }
        if changed {
            detokenize(&tokens)
        } else {
            text.to_string()
        }
    }

    fn is_noisy_word(&self, token: &Token) -> bool {
        token.kind == TokenKind::Word
            && token.text.chars().count() >= MIN_WORD_CHARS
            && token.text.chars().all(char::is_alphabetic)
            && !self.params.is_stopword(&token.text)
    }

    /// Prepend one sentence from a random article. Falls back to `text` after
    /// [`MAX_ATTEMPTS`] missing pages, empty summaries or source errors.
    pub async fn semantic_noise(&self, text: &str, rng: &mut StdRng) -> String {
        for attempt in 1..=MAX_ATTEMPTS {
            match self.knowledge.random_article().await {
                Ok(article) if !article.exists() => {
                    log::debug!("semantic noise attempt {}: page does not exist", attempt);
                }
                Ok(article) => match pick_sentence(article.summary(), rng) {
                    Some(sentence) => return format!("{}. {}", sentence, text),
                    None => log::debug!(
                        "semantic noise attempt {}: empty summary for {:?}",
                        attempt,
                        article.title()
                    ),
                },
                Err(e) if e.is_transient() => {
                    log::debug!("semantic noise attempt {}: {}", attempt, e);
                }
                Err(e) => {
                    log::warn!("semantic noise attempt {}: {}", attempt, e);
                }
            }
        }
        log::warn!(
            "semantic noise: no usable article after {} attempts, keeping query unchanged",
            MAX_ATTEMPTS
        );
        text.to_string()
    }
}

/// One non-empty sentence from `summary`, without its trailing period.
fn pick_sentence(summary: &str, rng: &mut StdRng) -> Option<String> {
    let sentences: Vec<&str> = summary
        .split(". ")
        .map(|s| s.trim().trim_end_matches('.').trim())
        .filter(|s| !s.is_empty())
        .collect();
    sentences.choose(rng).map(|s| s.to_string())
}

#[async_trait]
impl Augmentor for NoiseAugmentor {
    fn technique(&self) -> Technique {
        Technique::NoiseInjection
    }

    async fn augment(&self, text: &str, rng: &mut StdRng) -> String {
        self.augment_with(text, self.params.lexical, self.params.semantic, rng)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::augment::params::PartialAugmentationParams;
    use crate::knowledge::{Article, KnowledgeError};
    use rand::SeedableRng;
    use std::sync::Mutex;

    /// Serves scripted responses in order, then repeats the last one.
    struct ScriptedSource {
        script: Mutex<Vec<Result<Article, u16>>>,
        calls: Mutex<usize>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<Article, u16>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script),
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl KnowledgeSource for ScriptedSource {
        async fn random_article(&self) -> Result<Article, KnowledgeError> {
            *self.calls.lock().unwrap() += 1;
            let mut script = self.script.lock().unwrap();
            let next = if script.len() > 1 {
                script.remove(0)
            } else {
                script[0].clone()
            };
            next.map_err(|status| KnowledgeError::Api {
                status,
                body: String::new(),
            })
        }
    }

    fn noise(params: PartialAugmentationParams, source: Arc<ScriptedSource>) -> NoiseAugmentor {
        NoiseAugmentor::new(AugmentationParams::merged(Some(&params)), source)
    }

    #[tokio::test]
    async fn semantic_noise_prepends_sentence() {
        let source = ScriptedSource::new(vec![Ok(Article::new(
            "Rust",
            "Rust is a language.",
        ))]);
        let aug = noise(PartialAugmentationParams::default(), source.clone());
        let mut rng = StdRng::seed_from_u64(1);
        let out = aug.semantic_noise("What is [a] plus [b]?", &mut rng).await;
        assert_eq!(out, "Rust is a language. What is [a] plus [b]?");
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn semantic_noise_retries_missing_and_empty_pages() {
        let source = ScriptedSource::new(vec![
            Ok(Article::missing("Gone")),
            Ok(Article::new("Blank", "  ")),
            Err(503),
            Ok(Article::new("Moon", "The Moon orbits Earth")),
        ]);
        let aug = noise(PartialAugmentationParams::default(), source.clone());
        let mut rng = StdRng::seed_from_u64(1);
        let out = aug.semantic_noise("Find [x]", &mut rng).await;
        assert_eq!(out, "The Moon orbits Earth. Find [x]");
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test]
    async fn semantic_noise_gives_up_after_five_attempts() {
        let source = ScriptedSource::new(vec![Err(500)]);
        let aug = noise(PartialAugmentationParams::default(), source.clone());
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(aug.semantic_noise("Find [x]", &mut rng).await, "Find [x]");
        assert_eq!(source.calls(), MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn flags_switch_stages_off() {
        let source = ScriptedSource::new(vec![Ok(Article::new("A", "Alpha. Beta"))]);
        let aug = noise(PartialAugmentationParams::default(), source.clone());
        let mut rng = StdRng::seed_from_u64(1);
        let text = "Translate [sentence] into [language] quickly";
        assert_eq!(aug.augment_with(text, false, false, &mut rng).await, text);
        assert_eq!(source.calls(), 0);

        let out = aug.augment_with(text, false, true, &mut rng).await;
        assert!(out == format!("Alpha. {text}") || out == format!("Beta. {text}"), "{out}");
    }

    #[test]
    fn lexical_noise_changes_words_but_not_placeholders() {
        let source = ScriptedSource::new(vec![Err(500)]);
        let aug = noise(
            PartialAugmentationParams {
                word_percentage: Some(1.0),
                max_augment: Some(3),
                ..Default::default()
            },
            source,
        );
        let text = "Translate [sentence] into [target language] quickly please";
        let mut changed = 0;
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = aug.lexical_noise(text, &mut rng);
            assert!(out.contains("[sentence]"), "{out}");
            assert!(out.contains("[target language]"), "{out}");
            if out != text {
                changed += 1;
            }
        }
        assert!(changed > 0);
    }

    #[test]
    fn short_words_are_never_noised() {
        let source = ScriptedSource::new(vec![Err(500)]);
        let aug = noise(
            PartialAugmentationParams {
                word_percentage: Some(1.0),
                ..Default::default()
            },
            source,
        );
        let mut rng = StdRng::seed_from_u64(11);
        assert_eq!(aug.lexical_noise("Add [a] to [b]", &mut rng), "Add [a] to [b]");
    }

    #[test]
    fn typo_edits_one_letter_per_word() {
        let source = ScriptedSource::new(vec![Err(500)]);
        let aug = noise(
            PartialAugmentationParams {
                word_percentage: Some(0.0),
                min_augment: Some(1),
                max_augment: Some(1),
                ..Default::default()
            },
            source,
        );
        let mut rng = StdRng::seed_from_u64(8);
        let out = aug.keyboard_typos("multiply", &mut rng);
        let diff = out
            .chars()
            .zip("multiply".chars())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(diff, 1, "{out}");
    }

    #[test]
    fn pick_sentence_skips_empty_parts() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            pick_sentence(". Only one.", &mut rng).as_deref(),
            Some("Only one")
        );
        assert_eq!(pick_sentence("   ", &mut rng), None);
    }
}
