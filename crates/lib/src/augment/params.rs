//! Per-technique augmentation parameters and their merge over defaults.

use serde::{Deserialize, Serialize};

use super::{SetupError, Technique};

/// Resolved parameters for one technique. Every field is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentationParams {
    /// Fraction of eligible words to affect per call.
    pub word_percentage: f64,
    /// Fraction of characters per affected word (noise only).
    pub char_percentage: f64,
    pub min_augment: usize,
    pub max_augment: usize,
    /// Words inserted per `random_insert` call.
    pub insert_count: usize,
    /// Distinct random sub-operations composed per call.
    pub mixup_count: usize,
    /// Intermediate languages per back-translation round trip.
    pub hops: usize,
    /// Words never touched by word-level edits (compared case-insensitively).
    pub stopwords: Vec<String>,
    /// Noise only: apply typo and letter-swap noise.
    pub lexical: bool,
    /// Noise only: prepend an unrelated encyclopedia sentence.
    pub semantic: bool,
}

/// User-supplied overrides; missing fields fall back to [`AugmentationParams::default`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialAugmentationParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_augment: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_augment: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mixup_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hops: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopwords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexical: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic: Option<bool>,
}

impl Default for AugmentationParams {
    fn default() -> Self {
        Self {
            word_percentage: 0.2,
            char_percentage: 0.1,
            min_augment: 1,
            max_augment: 2,
            insert_count: 1,
            mixup_count: 2,
            hops: 2,
            stopwords: vec!["it".to_string(), "as".to_string()],
            lexical: true,
            semantic: true,
        }
    }
}

impl AugmentationParams {
    /// Merge user overrides over the defaults, field by field.
    pub fn merged(user: Option<&PartialAugmentationParams>) -> Self {
        let d = Self::default();
        let Some(u) = user else {
            return d;
        };
        Self {
            word_percentage: u.word_percentage.unwrap_or(d.word_percentage),
            char_percentage: u.char_percentage.unwrap_or(d.char_percentage),
            min_augment: u.min_augment.unwrap_or(d.min_augment),
            max_augment: u.max_augment.unwrap_or(d.max_augment),
            insert_count: u.insert_count.unwrap_or(d.insert_count),
            mixup_count: u.mixup_count.unwrap_or(d.mixup_count),
            hops: u.hops.unwrap_or(d.hops),
            stopwords: u.stopwords.clone().unwrap_or(d.stopwords),
            lexical: u.lexical.unwrap_or(d.lexical),
            semantic: u.semantic.unwrap_or(d.semantic),
        }
    }

    pub fn validate(&self, technique: Technique) -> Result<(), SetupError> {
        let invalid = |field: &'static str, reason: String| SetupError::InvalidParam {
            technique: technique.as_str(),
            field,
            reason,
        };
        if !(0.0..=1.0).contains(&self.word_percentage) {
            return Err(invalid(
                "word_percentage",
                format!("{} is outside [0, 1]", self.word_percentage),
            ));
        }
        if !(0.0..=1.0).contains(&self.char_percentage) {
            return Err(invalid(
                "char_percentage",
                format!("{} is outside [0, 1]", self.char_percentage),
            ));
        }
        if self.min_augment > self.max_augment {
            return Err(invalid(
                "min_augment",
                format!(
                    "{} is greater than max_augment {}",
                    self.min_augment, self.max_augment
                ),
            ));
        }
        if self.hops == 0 {
            return Err(invalid("hops", "must be at least 1".to_string()));
        }
        if !(1..=super::random::RandomOp::ALL.len()).contains(&self.mixup_count) {
            return Err(invalid(
                "mixup_count",
                format!(
                    "{} is outside 1..={}",
                    self.mixup_count,
                    super::random::RandomOp::ALL.len()
                ),
            ));
        }
        Ok(())
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.iter().any(|s| s.eq_ignore_ascii_case(word))
    }

    /// Number of units to edit: `ceil(word_percentage * size)` clamped to
    /// `[min_augment, max_augment]`, never more than `available`.
    pub fn word_count(&self, size: usize, available: usize) -> usize {
        bounded_count(self.word_percentage, size, self.min_augment, self.max_augment)
            .min(available)
    }

    /// Characters to edit in a word of `len` characters.
    pub fn char_count(&self, len: usize) -> usize {
        bounded_count(self.char_percentage, len, self.min_augment, self.max_augment).min(len)
    }
}

fn bounded_count(percentage: f64, size: usize, min: usize, max: usize) -> usize {
    let raw = (percentage * size as f64).ceil() as usize;
    raw.clamp(min, max.max(min))
}
