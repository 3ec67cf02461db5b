//! Dataset records flowing through the augmentation stage, and their JSON persistence.
//!
//! Expanded queries come in as [`GeneratedQuery`]; the orchestrator attaches variants as
//! [`AugmentedRecord`]; [`merge_prompts`] flattens both into the teacher-model prompt list.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::augment::Technique;

/// Anything carrying a base query the augmentors can work on.
pub trait QueryRecord {
    fn base_query(&self) -> &str;
}

impl QueryRecord for String {
    fn base_query(&self) -> &str {
        self
    }
}

/// One expanded query for one tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQuery {
    /// Tool the query is meant to invoke.
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_server_url: Option<String>,
    /// Template the query was expanded from.
    #[serde(default)]
    pub template: String,
    /// The base query, with `[placeholder]` parameter slots.
    pub expanded_query: String,
}

impl QueryRecord for GeneratedQuery {
    fn base_query(&self) -> &str {
        &self.expanded_query
    }
}

/// A base record plus the variants each active technique produced, in generation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentedRecord<R> {
    pub query: R,
    pub variants: BTreeMap<Technique, Vec<String>>,
}

impl<R> AugmentedRecord<R> {
    pub fn variant_count(&self) -> usize {
        self.variants.values().map(Vec::len).sum()
    }
}

/// Prompt handed to the teacher model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherPrompt {
    pub id: u64,
    pub query: String,
    pub is_augmented: bool,
    pub augmentation_technique: Option<Technique>,
    pub tool_name: String,
    pub mcp_server: Option<String>,
    pub mcp_server_url: Option<String>,
}

/// `[a]` -> `a`: the teacher sees parameter names, not template slots.
pub fn strip_brackets(s: &str) -> String {
    s.chars().filter(|&c| c != '[' && c != ']').collect()
}

/// Base queries first, then every variant (record, technique, generation order). Ids start at 1.
pub fn merge_prompts(records: &[AugmentedRecord<GeneratedQuery>]) -> Vec<TeacherPrompt> {
    let mut out = Vec::with_capacity(records.iter().map(|r| 1 + r.variant_count()).sum());
    let mut next_id = 1u64;
    let mut push = |q: &GeneratedQuery, text: &str, technique: Option<Technique>| {
        out.push(TeacherPrompt {
            id: next_id,
            query: strip_brackets(text),
            is_augmented: technique.is_some(),
            augmentation_technique: technique,
            tool_name: q.tool.clone(),
            mcp_server: q.mcp_server.clone(),
            mcp_server_url: q.mcp_server_url.clone(),
        });
        next_id += 1;
    };
    for r in records {
        push(&r.query, &r.query.expanded_query, None);
    }
    for r in records {
        for (technique, variants) in &r.variants {
            for v in variants {
                push(&r.query, v, Some(*technique));
            }
        }
    }
    out
}

/// Read a JSON array of expanded queries.
pub fn load_queries(path: &Path) -> Result<Vec<GeneratedQuery>> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("reading queries from {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing queries from {}", path.display()))
}

/// Write `value` as pretty JSON, creating parent directories as needed.
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).with_context(|| format!("writing {}", path.display()))?;
    log::info!("saved {}", path.display());
    Ok(())
}

pub fn augmented_file_name(seed: u64) -> String {
    format!("augmented_seed_{}.json", seed)
}

pub fn merged_file_name(seed: u64) -> String {
    format!("merged_seed_{}.json", seed)
}
