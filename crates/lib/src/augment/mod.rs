//! Query augmentation: turn one base query into lexically diverse variants while keeping
//! every `[placeholder]` intact.
//!
//! Three techniques are available: back-translation through random languages, lexical and
//! semantic noise, and random word-level edits. Each is an [`Augmentor`]; randomness always
//! comes from the caller's seeded [`StdRng`].

mod back_translation;
mod keyboard;
mod lexicon;
mod noise;
mod params;
mod random;
pub mod tokenizer;

use async_trait::async_trait;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use back_translation::{BackTranslationAugmentor, SUPPORTED_LANGUAGES};
pub use lexicon::{Lexicon, Thesaurus, WordSampler};
pub use noise::NoiseAugmentor;
pub use params::{AugmentationParams, PartialAugmentationParams};
pub use random::{RandomAugmentor, RandomOp};

/// Attempts made by augmentors that depend on an unreliable external service.
pub const MAX_ATTEMPTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("unknown augmentation technique: {0}")]
    UnknownTechnique(String),
    #[error("invalid {technique} parameter {field}: {reason}")]
    InvalidParam {
        technique: &'static str,
        field: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Technique {
    BackTranslation,
    NoiseInjection,
    RandomAugmentation,
}

impl Technique {
    /// Canonical order, used when building the active set.
    pub const ALL: [Technique; 3] = [
        Technique::BackTranslation,
        Technique::NoiseInjection,
        Technique::RandomAugmentation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Technique::BackTranslation => "back_translation",
            Technique::NoiseInjection => "noise_injection",
            Technique::RandomAugmentation => "random_augmentation",
        }
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Technique {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Technique::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| SetupError::UnknownTechnique(name.to_string()))
    }
}

/// Produces one variant of a base query per call.
///
/// Implementations never fail: when an external dependency misbehaves they degrade to
/// returning `text` unchanged.
#[async_trait]
pub trait Augmentor: Send + Sync {
    fn technique(&self) -> Technique;

    async fn augment(&self, text: &str, rng: &mut StdRng) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn technique_names_round_trip() {
        for t in Technique::ALL {
            assert_eq!(t.as_str().parse::<Technique>().unwrap(), t);
        }
        assert_eq!(
            serde_json::to_string(&Technique::NoiseInjection).unwrap(),
            "\"noise_injection\""
        );
    }

    #[test]
    fn unknown_technique_is_an_error() {
        let err = "paraphrase".parse::<Technique>().unwrap_err();
        assert_eq!(err.to_string(), "unknown augmentation technique: paraphrase");
    }
}
