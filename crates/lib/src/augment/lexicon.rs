//! Lexical data sources for word-level augmentation: a thesaurus for synonym
//! replacement and a word list for random insertion.
//!
//! Bundled defaults live in `crates/lib/config/`; `lexicon.thesaurus` and `lexicon.words`
//! in the config file point to replacements.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::path::Path;

static BUNDLED_THESAURUS: &str = include_str!("../../config/thesaurus.txt");
static BUNDLED_WORDS: &str = include_str!("../../config/words.txt");

/// Word -> candidate synonyms.
pub trait Thesaurus: Send + Sync {
    /// Synonyms for `word` (case-insensitive lookup). Empty when none are known.
    fn synonyms(&self, word: &str) -> Vec<String>;
}

/// Uniform sampler over real words.
pub trait WordSampler: Send + Sync {
    fn random_word(&self, rng: &mut StdRng) -> Option<String>;
}

/// In-memory thesaurus and word list.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    synonyms: HashMap<String, Vec<String>>,
    words: Vec<String>,
}

impl Lexicon {
    pub fn bundled() -> Self {
        Self::parse(BUNDLED_THESAURUS, BUNDLED_WORDS)
    }

    /// Load from files, falling back to the bundled data for whichever path is `None`.
    pub fn load(thesaurus: Option<&Path>, words: Option<&Path>) -> Result<Self> {
        let thesaurus_text = match thesaurus {
            Some(p) => std::fs::read_to_string(p)
                .with_context(|| format!("reading thesaurus from {}", p.display()))?,
            None => {
                log::info!("using the bundled thesaurus; set lexicon.thesaurus for wider coverage");
                BUNDLED_THESAURUS.to_string()
            }
        };
        let words_text = match words {
            Some(p) => std::fs::read_to_string(p)
                .with_context(|| format!("reading word list from {}", p.display()))?,
            None => BUNDLED_WORDS.to_string(),
        };
        let lexicon = Self::parse(&thesaurus_text, &words_text);
        log::debug!(
            "lexicon loaded: {} headwords, {} words",
            lexicon.synonyms.len(),
            lexicon.words.len()
        );
        Ok(lexicon)
    }

    /// Thesaurus lines are `word<TAB>syn1,syn2,...`; word list lines hold one word.
    /// Blank lines and `#` comments are skipped in both.
    pub fn parse(thesaurus: &str, words: &str) -> Self {
        let mut synonyms: HashMap<String, Vec<String>> = HashMap::new();
        for line in content_lines(thesaurus) {
            let Some((head, rest)) = line.split_once('\t') else {
                log::debug!("skipping thesaurus line without tab: {}", line);
                continue;
            };
            let head = head.trim().to_lowercase();
            let entry = synonyms.entry(head.clone()).or_default();
            for syn in rest.split(',') {
                let syn = syn.trim().replace('_', " ");
                if !syn.is_empty() && syn.to_lowercase() != head && !entry.contains(&syn) {
                    entry.push(syn);
                }
            }
        }
        synonyms.retain(|_, v| !v.is_empty());
        let words = content_lines(words).map(str::to_string).collect();
        Self { synonyms, words }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }
}

fn content_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
}

impl Thesaurus for Lexicon {
    fn synonyms(&self, word: &str) -> Vec<String> {
        self.synonyms
            .get(&word.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }
}

impl WordSampler for Lexicon {
    fn random_word(&self, rng: &mut StdRng) -> Option<String> {
        self.words.choose(rng).cloned()
    }
}
