//! Augmentation orchestrator: owns the active augmentors and per-technique variant counts,
//! and drives variant generation for a batch of records.
//!
//! Each record gets its own random source, seeded from the run's source in input order, so a
//! fixed seed reproduces the same variants no matter how many records run concurrently.

use futures_util::stream::{self, StreamExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::augment::{
    AugmentationParams, Augmentor, BackTranslationAugmentor, Lexicon, NoiseAugmentor,
    RandomAugmentor, SetupError, Technique, Thesaurus, WordSampler,
};
use crate::config::{resolve_relative, AugmentationSettings, Config};
use crate::dataset::{AugmentedRecord, QueryRecord};
use crate::knowledge::{KnowledgeSource, WikipediaClient};
use crate::translate::{GoogleTranslateClient, Translator};

/// External services and data sources the augmentors depend on.
#[derive(Clone)]
pub struct Collaborators {
    pub translator: Arc<dyn Translator>,
    pub knowledge: Arc<dyn KnowledgeSource>,
    pub thesaurus: Arc<dyn Thesaurus>,
    pub words: Arc<dyn WordSampler>,
}

impl Collaborators {
    /// HTTP clients and lexicon as configured. Relative lexicon paths resolve against the
    /// config file's parent.
    pub fn from_config(config: &Config, config_path: &Path) -> anyhow::Result<Self> {
        let translator = GoogleTranslateClient::new(
            config.translation.base_url.clone(),
            Duration::from_secs(config.translation.timeout_secs),
        )?;
        let knowledge = WikipediaClient::new(
            config.knowledge.base_url.clone(),
            config.knowledge.user_agent.as_deref(),
            Duration::from_secs(config.knowledge.timeout_secs),
        )?;
        let thesaurus = config
            .lexicon
            .thesaurus
            .as_ref()
            .map(|p| resolve_relative(config_path, p));
        let words = config
            .lexicon
            .words
            .as_ref()
            .map(|p| resolve_relative(config_path, p));
        let lexicon = Arc::new(Lexicon::load(thesaurus.as_deref(), words.as_deref())?);
        Ok(Self {
            translator: Arc::new(translator),
            knowledge: Arc::new(knowledge),
            thesaurus: lexicon.clone(),
            words: lexicon,
        })
    }
}

pub struct AugmentationOrchestrator {
    augmentors: Vec<Box<dyn Augmentor>>,
    variant_counts: BTreeMap<Technique, usize>,
    concurrency: usize,
}

impl AugmentationOrchestrator {
    /// Augmentors run in the given order. A technique without a count produces no variants.
    pub fn new(
        augmentors: Vec<Box<dyn Augmentor>>,
        variant_counts: BTreeMap<Technique, usize>,
    ) -> Self {
        Self {
            augmentors,
            variant_counts,
            concurrency: 1,
        }
    }

    /// Records processed at once. Does not change the output.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Build the active set from settings: every technique in canonical order minus the
    /// excluded ones, each with its merged and validated parameters. Unknown technique names
    /// anywhere in the settings are an error.
    pub fn from_settings(
        settings: &AugmentationSettings,
        collaborators: &Collaborators,
    ) -> Result<Self, SetupError> {
        let excluded = settings
            .exclude
            .iter()
            .map(|s| s.parse::<Technique>())
            .collect::<Result<Vec<_>, _>>()?;
        let mut counts = BTreeMap::new();
        for (name, n) in &settings.variants {
            counts.insert(name.parse::<Technique>()?, *n);
        }
        for name in settings.techniques.keys() {
            name.parse::<Technique>()?;
        }

        let mut augmentors: Vec<Box<dyn Augmentor>> = Vec::new();
        for technique in Technique::ALL {
            if excluded.contains(&technique) {
                log::debug!("augmentation: {} excluded", technique);
                continue;
            }
            let params = AugmentationParams::merged(settings.techniques.get(technique.as_str()));
            params.validate(technique)?;
            let augmentor: Box<dyn Augmentor> = match technique {
                Technique::BackTranslation => Box::new(BackTranslationAugmentor::new(
                    &params,
                    collaborators.translator.clone(),
                )),
                Technique::NoiseInjection => Box::new(NoiseAugmentor::new(
                    params,
                    collaborators.knowledge.clone(),
                )),
                Technique::RandomAugmentation => Box::new(RandomAugmentor::new(
                    params,
                    collaborators.thesaurus.clone(),
                    collaborators.words.clone(),
                )),
            };
            counts.entry(technique).or_insert(1);
            augmentors.push(augmentor);
        }

        Ok(Self::new(augmentors, counts).with_concurrency(settings.concurrency))
    }

    /// Active techniques in run order.
    pub fn techniques(&self) -> Vec<Technique> {
        self.augmentors.iter().map(|a| a.technique()).collect()
    }

    pub fn variant_count(&self, technique: Technique) -> usize {
        self.variant_counts.get(&technique).copied().unwrap_or(0)
    }

    /// One output record per input record, in input order, each holding exactly
    /// `variant_count(t)` variants for every active technique `t`.
    pub async fn generate_variants<R>(
        &self,
        records: &[R],
        rng: &mut StdRng,
    ) -> Vec<AugmentedRecord<R>>
    where
        R: QueryRecord + Clone,
    {
        let seeds: Vec<u64> = records.iter().map(|_| rng.gen()).collect();
        log::info!(
            "augmenting {} records with {:?} (concurrency {})",
            records.len(),
            self.techniques(),
            self.concurrency
        );
        let out: Vec<AugmentedRecord<R>> = stream::iter(records.iter().zip(seeds))
            .map(|(record, seed)| self.augment_record(record, seed))
            .buffered(self.concurrency)
            .collect()
            .await;
        log::info!(
            "augmentation complete: {} variants",
            out.iter().map(AugmentedRecord::variant_count).sum::<usize>()
        );
        out
    }

    async fn augment_record<R>(&self, record: &R, seed: u64) -> AugmentedRecord<R>
    where
        R: QueryRecord + Clone,
    {
        let mut rng = StdRng::seed_from_u64(seed);
        let base = record.base_query();
        let mut variants = BTreeMap::new();
        for augmentor in &self.augmentors {
            let technique = augmentor.technique();
            let n = self.variant_count(technique);
            let mut produced = Vec::with_capacity(n);
            for _ in 0..n {
                let variant = augmentor.augment(base, &mut rng).await;
                if variant == base {
                    log::warn!("{}: variant identical to base query {:?}", technique, base);
                }
                produced.push(variant);
            }
            variants.insert(technique, produced);
        }
        AugmentedRecord {
            query: record.clone(),
            variants,
        }
    }
}
