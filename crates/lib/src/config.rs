//! Configuration types and loading.
//!
//! Config is loaded from a YAML file (e.g. `~/.shrink/config.yaml`) and environment.
//! Every section has defaults, so an empty or missing file is a valid configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::augment::PartialAugmentationParams;

/// Top-level application config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Seed for the run's random source. Overridden by SHRINK_SEED env.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Which techniques run, how many variants each produces, and their parameters.
    #[serde(default)]
    pub augmentation: AugmentationSettings,

    /// Machine translation service used by back-translation.
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Encyclopedia used by semantic noise.
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Thesaurus and word list overrides.
    #[serde(default)]
    pub lexicon: LexiconConfig,

    #[serde(default)]
    pub paths: PathsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            augmentation: AugmentationSettings::default(),
            translation: TranslationConfig::default(),
            knowledge: KnowledgeConfig::default(),
            lexicon: LexiconConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

/// Augmentation stage settings. Technique names are validated when the orchestrator is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AugmentationSettings {
    /// Variants per technique (e.g. `back_translation: 2`). Active techniques missing here get 1.
    #[serde(default)]
    pub variants: BTreeMap<String, usize>,

    /// Techniques to leave out of the active set.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Per-technique parameter overrides, merged over the defaults.
    #[serde(default)]
    pub techniques: BTreeMap<String, PartialAugmentationParams>,

    /// Records augmented concurrently (default 1). Output does not depend on this value.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for AugmentationSettings {
    fn default() -> Self {
        Self {
            variants: BTreeMap::new(),
            exclude: Vec::new(),
            techniques: BTreeMap::new(),
            concurrency: default_concurrency(),
        }
    }
}

/// Translation service endpoint and timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranslationConfig {
    /// Base URL; default is the public Google Translate endpoint.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds (default 10).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Encyclopedia endpoint, user agent and timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KnowledgeConfig {
    /// Base URL of a Wikipedia REST API; default is English Wikipedia.
    #[serde(default)]
    pub base_url: Option<String>,

    /// User-Agent sent with each request.
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds (default 10).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            user_agent: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Optional replacements for the bundled lexicon files. Relative paths are resolved against
/// the config file's parent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LexiconConfig {
    #[serde(default)]
    pub thesaurus: Option<PathBuf>,
    #[serde(default)]
    pub words: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Where augmented datasets are written (default "output").
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_seed() -> u64 {
    1
}

fn default_concurrency() -> usize {
    1
}

fn default_timeout_secs() -> u64 {
    crate::http::DEFAULT_TIMEOUT.as_secs()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

/// Resolve the seed: env SHRINK_SEED overrides config.
pub fn resolve_seed(config: &Config) -> u64 {
    std::env::var("SHRINK_SEED")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            match t.parse::<u64>() {
                Ok(v) => Some(v),
                Err(_) => {
                    if !t.is_empty() {
                        log::warn!("ignoring SHRINK_SEED={:?}: not an unsigned integer", t);
                    }
                    None
                }
            }
        })
        .unwrap_or(config.seed)
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("SHRINK_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".shrink").join("config.yaml"))
                .unwrap_or_else(|| PathBuf::from("config.yaml"))
        })
}

/// Load config from the given path, SHRINK_CONFIG_PATH, or the default. Missing file => default config.
/// Returns the config and the path that was used (for resolving relative paths).
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        parse_config(&s).with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

/// Parse YAML config text. An empty document yields the defaults.
pub fn parse_config(s: &str) -> Result<Config> {
    if s.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(s)?)
}

/// Resolve `p` against the config file's parent unless it is absolute.
pub fn resolve_relative(config_path: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        return p.to_path_buf();
    }
    config_path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .join(p)
}
