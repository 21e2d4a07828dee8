//! Detection aggregation: resolve every detection label, then count
//! detections per bone, with left and right merged.
//!
//! Aggregation is total. A label that is empty, malformed, or simply not
//! in the catalog is counted as unresolved and never aborts the batch.
//! Catalog failures are the exception and are propagated.

use std::collections::HashMap;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::catalog::BoneCatalog;
use crate::models::{
    AggregatedDetectionSummary, RawDetection, Resolution, ResolvedBone, SummaryEntry,
};
use crate::normalize::normalize;
use crate::resolve::resolve;

static ZH_NUMERIC_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(\d+\)\s*$").expect("valid suffix pattern"));

/// Strip a trailing disambiguating number such as the ` (24)` in
/// `肋骨 (24)`. Returns `None` when nothing is left.
pub fn clean_zh_name(name: &str) -> Option<String> {
    let cleaned = ZH_NUMERIC_SUFFIX.replace(name, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Build the user-facing bone name: `"{zh}（{en}）"` when both exist,
/// otherwise whichever is present.
pub fn display_name(zh_name: &str, en_name: &str) -> Option<String> {
    let zh = clean_zh_name(zh_name);
    let en = Some(en_name.trim()).filter(|s| !s.is_empty());
    match (zh, en) {
        (Some(zh), Some(en)) => Some(format!("{zh}（{en}）")),
        (Some(zh), None) => Some(zh),
        (None, Some(en)) => Some(en.to_string()),
        (None, None) => None,
    }
}

/// Detector class names that must be rewritten before catalog lookup,
/// e.g. `Phalanges_Hand` → `Phalanges` or `Tibia` → `Tibiae`.
///
/// Keys match labels exactly (case-sensitive).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct LabelAliases(HashMap<String, String>);

impl LabelAliases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, catalog_name: impl Into<String>) {
        self.0.insert(label.into(), catalog_name.into());
    }

    /// The catalog name to look up for `label`.
    pub fn apply<'a>(&'a self, label: &'a str) -> &'a str {
        self.0.get(label).map(String::as_str).unwrap_or(label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, String>> for LabelAliases {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

/// Resolves and tallies detections against one catalog.
pub struct Aggregator<'a, C: BoneCatalog + ?Sized> {
    catalog: &'a C,
    aliases: LabelAliases,
}

impl<'a, C: BoneCatalog + ?Sized> Aggregator<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self {
            catalog,
            aliases: LabelAliases::default(),
        }
    }

    pub fn with_aliases(mut self, aliases: LabelAliases) -> Self {
        self.aliases = aliases;
        self
    }

    /// Resolve a single detector label (aliases applied first).
    pub async fn resolve_label(&self, label: &str) -> Result<Resolution> {
        let ident = normalize(self.aliases.apply(label));
        resolve(&ident, self.catalog).await
    }

    /// Resolve every detection, index-aligned with the input. Each distinct
    /// label is looked up once per call.
    pub async fn resolve_all(&self, detections: &[RawDetection]) -> Result<Vec<Resolution>> {
        let mut cache: HashMap<&str, Resolution> = HashMap::new();
        let mut out = Vec::with_capacity(detections.len());
        for det in detections {
            let resolution = match cache.get(det.label.as_str()) {
                Some(r) => r.clone(),
                None => {
                    let r = self.resolve_label(&det.label).await?;
                    cache.insert(det.label.as_str(), r.clone());
                    r
                }
            };
            out.push(resolution);
        }
        debug!(
            detections = detections.len(),
            distinct_labels = cache.len(),
            "resolved detection labels"
        );
        Ok(out)
    }

    /// Resolve and tally `detections`.
    pub async fn aggregate(&self, detections: &[RawDetection]) -> Result<AggregatedDetectionSummary> {
        let resolutions = self.resolve_all(detections).await?;
        Ok(tally(&resolutions))
    }
}

fn merge_key(bone: &ResolvedBone) -> String {
    if bone.group_key.is_empty() {
        bone.display_name.clone()
    } else {
        bone.group_key.to_ascii_lowercase()
    }
}

/// Aggregate detections against `catalog` with no label aliases.
pub async fn aggregate<C: BoneCatalog + ?Sized>(
    catalog: &C,
    detections: &[RawDetection],
) -> Result<AggregatedDetectionSummary> {
    Aggregator::new(catalog).aggregate(detections).await
}

/// Count resolutions per bone.
///
/// Bones are merged on their side-free [`ResolvedBone::group_key`]
/// (ASCII case-insensitive), so left and right rows count as one entry even
/// when the catalog gives them different ids. Each entry shows the first
/// display name seen for its key. Entries come out in descending count
/// order; ties keep first-seen order. Not-found resolutions, and resolved
/// bones without any usable name, go to `unresolved_count`.
pub fn tally(resolutions: &[Resolution]) -> AggregatedDetectionSummary {
    let mut entries: Vec<SummaryEntry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut unresolved_count = 0;

    for resolution in resolutions {
        let bone = resolution
            .resolved()
            .filter(|b| !b.display_name.is_empty());
        match bone {
            Some(bone) => {
                let key = merge_key(bone);
                match index.get(&key) {
                    Some(&i) => entries[i].count += 1,
                    None => {
                        index.insert(key, entries.len());
                        entries.push(SummaryEntry {
                            display_name: bone.display_name.clone(),
                            count: 1,
                        });
                    }
                }
            }
            None => unresolved_count += 1,
        }
    }

    entries.sort_by(|a, b| b.count.cmp(&a.count));

    AggregatedDetectionSummary {
        entries,
        unresolved_count,
    }
}
