//! Random word-level augmentation: synonym replacement, swap, insertion and deletion,
//! composed `mixup_count` at a time in random order.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

use super::lexicon::{Thesaurus, WordSampler};
use super::params::AugmentationParams;
use super::tokenizer::{detokenize, tokenize, Token, TokenKind};
use super::{Augmentor, Technique};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomOp {
    SynonymReplacement,
    RandomSwap,
    RandomInsert,
    RandomDelete,
}

impl RandomOp {
    pub const ALL: [RandomOp; 4] = [
        RandomOp::SynonymReplacement,
        RandomOp::RandomSwap,
        RandomOp::RandomInsert,
        RandomOp::RandomDelete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RandomOp::SynonymReplacement => "synonym_replacement",
            RandomOp::RandomSwap => "random_swap",
            RandomOp::RandomInsert => "random_insert",
            RandomOp::RandomDelete => "random_delete",
        }
    }
}

pub struct RandomAugmentor {
    params: AugmentationParams,
    thesaurus: Arc<dyn Thesaurus>,
    sampler: Arc<dyn WordSampler>,
}

impl RandomAugmentor {
    pub fn new(
        params: AugmentationParams,
        thesaurus: Arc<dyn Thesaurus>,
        sampler: Arc<dyn WordSampler>,
    ) -> Self {
        Self {
            params,
            thesaurus,
            sampler,
        }
    }

    /// Apply `mixup_count` distinct operations, drawn without replacement, in sequence.
    pub fn mixup(&self, text: &str, rng: &mut StdRng) -> String {
        let count = self.params.mixup_count.min(RandomOp::ALL.len());
        let ops: Vec<RandomOp> = RandomOp::ALL.choose_multiple(rng, count).copied().collect();
        let mut out = text.to_string();
        for op in ops {
            log::trace!("random augmentation: {}", op.as_str());
            out = self.apply(op, &out, rng);
        }
        out
    }

    pub fn apply(&self, op: RandomOp, text: &str, rng: &mut StdRng) -> String {
        match op {
            RandomOp::SynonymReplacement => self.synonym_replacement(text, rng),
            RandomOp::RandomSwap => self.random_swap(text, rng),
            RandomOp::RandomInsert => self.random_insert(text, rng),
            RandomOp::RandomDelete => self.random_delete(text, rng),
        }
    }

    /// Replace eligible words with a thesaurus synonym. Words without synonyms stay as they are.
    pub fn synonym_replacement(&self, text: &str, rng: &mut StdRng) -> String {
        let mut tokens = tokenize(text);
        let eligible: Vec<usize> = self.editable_words(&tokens);
        let count = self.params.word_count(content_len(&tokens), eligible.len());
        let chosen: Vec<usize> = eligible.choose_multiple(rng, count).copied().collect();

        let mut changed = false;
        for idx in chosen {
            let word = tokens[idx].text.clone();
            let synonyms = self.thesaurus.synonyms(&word);
            if let Some(syn) = synonyms.choose(rng) {
                tokens[idx].text = match_case(&word, syn);
                changed = true;
            }
        }
        if changed {
            detokenize(&tokens)
        } else {
            text.to_string()
        }
    }

    /// Swap randomly chosen pairs of words. Placeholders move as whole tokens.
    pub fn random_swap(&self, text: &str, rng: &mut StdRng) -> String {
        let mut tokens = tokenize(text);
        let positions: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_placeholder() || self.is_editable_word(t))
            .map(|(i, _)| i)
            .collect();
        if positions.len() < 2 {
            return text.to_string();
        }
        let count = self.params.word_count(content_len(&tokens), positions.len());
        if count == 0 {
            return text.to_string();
        }
        for _ in 0..count {
            let pair: Vec<usize> = positions.choose_multiple(rng, 2).copied().collect();
            tokens.swap(pair[0], pair[1]);
        }
        detokenize(&tokens)
    }

    /// Insert `insert_count` random words strictly between the first and last word.
    /// Texts with fewer than two words are returned unchanged.
    pub fn random_insert(&self, text: &str, rng: &mut StdRng) -> String {
        let mut tokens = tokenize(text);
        if content_len(&tokens) < 2 {
            return text.to_string();
        }
        let mut inserted = 0;
        for _ in 0..self.params.insert_count {
            let Some(word) = self.sampler.random_word(rng) else {
                log::warn!("random insert: word list is empty");
                break;
            };
            let content: Vec<usize> = content_indices(&tokens);
            let k = rng.gen_range(1..content.len());
            tokens.insert(content[k], Token::word(word));
            inserted += 1;
        }
        if inserted == 0 {
            return text.to_string();
        }
        detokenize(&tokens)
    }

    /// Delete eligible words. Placeholders are never deleted, and a deletion that would leave
    /// no words at all is skipped.
    pub fn random_delete(&self, text: &str, rng: &mut StdRng) -> String {
        let tokens = tokenize(text);
        let total = content_len(&tokens);
        let eligible = self.editable_words(&tokens);
        let count = self.params.word_count(total, eligible.len());
        if count == 0 || count >= total {
            return text.to_string();
        }
        let mut chosen: Vec<usize> = eligible.choose_multiple(rng, count).copied().collect();
        chosen.sort_unstable();
        let kept: Vec<Token> = tokens
            .into_iter()
            .enumerate()
            .filter(|(i, _)| chosen.binary_search(i).is_err())
            .map(|(_, t)| t)
            .collect();
        detokenize(&kept)
    }

    fn is_editable_word(&self, token: &Token) -> bool {
        token.kind == TokenKind::Word && !self.params.is_stopword(&token.text)
    }

    fn editable_words(&self, tokens: &[Token]) -> Vec<usize> {
        tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| self.is_editable_word(t))
            .map(|(i, _)| i)
            .collect()
    }
}

#[async_trait]
impl Augmentor for RandomAugmentor {
    fn technique(&self) -> Technique {
        Technique::RandomAugmentation
    }

    async fn augment(&self, text: &str, rng: &mut StdRng) -> String {
        self.mixup(text, rng)
    }
}

fn content_indices(tokens: &[Token]) -> Vec<usize> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_content())
        .map(|(i, _)| i)
        .collect()
}

fn content_len(tokens: &[Token]) -> usize {
    tokens.iter().filter(|t| t.is_content()).count()
}

/// Capitalize `replacement` when `original` starts with an uppercase letter.
fn match_case(original: &str, replacement: &str) -> String {
    let capitalized = original.chars().next().is_some_and(char::is_uppercase);
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) if capitalized => first.to_uppercase().chain(chars).collect(),
        _ => replacement.to_string(),
    }
}
