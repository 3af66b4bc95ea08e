//! Bucket keys and long-tail collapsing.
//!
//! An issue maps to zero or more bucket keys along a [`Dimension`]: the
//! sublabels it carries in one label category, or its full label texts.
//! Rare keys are folded into [`OTHER_BUCKET`] by [`collapse_long_tail`].

use crate::error::{MetricsError, Result};
use crate::model::Issue;
use schemars::JsonSchema;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// Key that absorbs low-frequency buckets.
pub const OTHER_BUCKET: &str = "other";

/// What an issue is bucketed by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Dimension {
    /// Sublabels of the labels in this category.
    Category(String),
    /// Full label text of every label.
    Label,
}

impl Dimension {
    /// Distinct bucket keys for `issue`, in label order.
    ///
    /// Issues with no qualifying label yield an empty list and are left out of
    /// bucketed analyses.
    #[must_use]
    pub fn keys(&self, issue: &Issue) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut keys = Vec::new();

        let candidates: Box<dyn Iterator<Item = String> + '_> = match self {
            Self::Category(category) => Box::new(
                issue
                    .labels_in(category)
                    .filter_map(|label| label.sublabel.clone()),
            ),
            Self::Label => Box::new(issue.labels.iter().map(|label| label.full_label())),
        };

        for key in candidates {
            if seen.insert(key.clone()) {
                keys.push(key);
            }
        }
        keys
    }

    /// Short human-readable name, used in report headings.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Category(category) => category.clone(),
            Self::Label => "label".to_string(),
        }
    }
}

/// Relative-frequency threshold in the open interval (0, 1).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, JsonSchema)]
pub struct CutoffFraction(f64);

impl CutoffFraction {
    /// Default for duration/age distributions.
    pub const DISTRIBUTION: Self = Self(0.05);
    /// Default for the open-issue census.
    pub const CENSUS: Self = Self(0.02);

    /// Validate a cutoff.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::InvalidParameter`] unless `0 < value < 1`.
    pub fn new(value: f64) -> Result<Self> {
        if value > 0.0 && value < 1.0 {
            Ok(Self(value))
        } else {
            Err(MetricsError::InvalidParameter {
                name: "cutoff",
                value: value.to_string(),
                valid: vec!["a fraction strictly between 0 and 1".to_string()],
            })
        }
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl FromStr for CutoffFraction {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        let value: f64 = s.trim().parse().map_err(|_| MetricsError::InvalidParameter {
            name: "cutoff",
            value: s.to_string(),
            valid: vec!["a fraction strictly between 0 and 1".to_string()],
        })?;
        Self::new(value)
    }
}

impl fmt::Display for CutoffFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for CutoffFraction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

/// A value tagged with the bucket keys it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Tagged<T> {
    pub keys: Vec<String>,
    pub value: T,
}

impl<T> Tagged<T> {
    pub const fn new(keys: Vec<String>, value: T) -> Self {
        Self { keys, value }
    }
}

/// Count observations per key across all tagged values.
#[must_use]
pub fn key_counts<T>(tagged: &[Tagged<T>]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for item in tagged {
        for key in &item.keys {
            *counts.entry(key.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Keys that survive collapsing: count strictly above `total × cutoff`.
#[must_use]
pub fn surviving_keys(counts: &BTreeMap<String, usize>, cutoff: CutoffFraction) -> BTreeSet<String> {
    let total: usize = counts.values().sum();
    let threshold = total as f64 * cutoff.value();
    counts
        .iter()
        .filter(|(_, count)| **count as f64 > threshold)
        .map(|(key, _)| key.clone())
        .collect()
}

/// Fold rare keys into [`OTHER_BUCKET`] and group values per bucket.
///
/// Pass one counts observations per key; pass two relabels every key at or
/// under `total × cutoff` to `"other"` and pushes each value into its buckets.
/// A value lands at most once in a bucket even if several of its keys were
/// relabeled. Values without keys are ignored; no observations yields an
/// empty map.
#[must_use]
pub fn collapse_long_tail<T: Clone>(
    tagged: &[Tagged<T>],
    cutoff: CutoffFraction,
) -> BTreeMap<String, Vec<T>> {
    let counts = key_counts(tagged);
    if counts.is_empty() {
        return BTreeMap::new();
    }
    let keep = surviving_keys(&counts, cutoff);
    trace!(
        buckets = counts.len(),
        kept = keep.len(),
        cutoff = cutoff.value(),
        "Collapsing long tail"
    );

    let mut buckets: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for item in tagged {
        let mut placed = BTreeSet::new();
        for key in &item.keys {
            let bucket = if keep.contains(key) {
                key.as_str()
            } else {
                OTHER_BUCKET
            };
            if placed.insert(bucket) {
                buckets
                    .entry(bucket.to_string())
                    .or_default()
                    .push(item.value.clone());
            }
        }
    }
    buckets
}

/// Relabel the keys of each tagged value the way [`collapse_long_tail`] does,
/// keeping the values tagged rather than grouped.
#[must_use]
pub fn relabel_long_tail<T: Clone>(tagged: &[Tagged<T>], cutoff: CutoffFraction) -> Vec<Tagged<T>> {
    let counts = key_counts(tagged);
    let keep = surviving_keys(&counts, cutoff);

    tagged
        .iter()
        .filter(|item| !item.keys.is_empty())
        .map(|item| {
            let mut keys: Vec<String> = Vec::with_capacity(item.keys.len());
            for key in &item.keys {
                let bucket = if keep.contains(key) {
                    key.clone()
                } else {
                    OTHER_BUCKET.to_string()
                };
                if !keys.contains(&bucket) {
                    keys.push(bucket);
                }
            }
            Tagged::new(keys, item.value.clone())
        })
        .collect()
}

/// The `k` most frequent keys, by count descending then key ascending.
#[must_use]
pub fn top_k(counts: &BTreeMap<String, usize>, k: usize) -> Vec<String> {
    let mut ranked: Vec<(&String, &usize)> = counts.iter().collect();
    ranked.sort_by(|(a_key, a_count), (b_key, b_count)| {
        b_count.cmp(a_count).then_with(|| a_key.cmp(b_key))
    });
    ranked.into_iter().take(k).map(|(key, _)| key.clone()).collect()
}
