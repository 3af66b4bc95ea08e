//! Labels ranked by how long their issues stay open.

use super::Summary;
use crate::lifecycle::{Measurement, measure};
use crate::model::Issue;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Default number of labels listed per section.
pub const DEFAULT_RANKING_LIMIT: usize = 10;

/// One ranked label.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct LabelRanking {
    pub label: String,
    #[serde(flatten)]
    pub summary: Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct RankingSection {
    /// All measured issues of this state, labeled or not.
    pub overall: Option<Summary>,
    /// Slowest labels first.
    pub labels: Vec<LabelRanking>,
    pub labels_considered: usize,
}

/// Slowest labels to close and stalest labels still open.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct RankingReport {
    pub as_of: DateTime<Utc>,
    pub limit: usize,
    pub closed: RankingSection,
    pub open: RankingSection,
}

/// Rank full labels by mean time-to-close and by mean open age.
///
/// Labels are not long-tail collapsed. Each section lists at most `limit`
/// labels, highest mean first, ties broken by label text.
pub fn lifecycle_ranking<'a, I>(issues: I, as_of: DateTime<Utc>, limit: usize) -> RankingReport
where
    I: IntoIterator<Item = &'a Issue>,
{
    info!(limit, "Ranking labels by lifecycle time");

    let mut closed = Accumulator::default();
    let mut open = Accumulator::default();

    for issue in issues {
        let Some(measurement) = measure(issue, as_of) else {
            continue;
        };
        let target = match measurement {
            Measurement::Duration(_) => &mut closed,
            Measurement::Age(_) => &mut open,
        };
        target.push(issue, measurement.days());
    }

    debug!(
        closed = closed.all.len(),
        open = open.all.len(),
        "Measured issues for ranking"
    );

    RankingReport {
        as_of,
        limit,
        closed: closed.rank(limit),
        open: open.rank(limit),
    }
}

#[derive(Default)]
struct Accumulator {
    all: Vec<f64>,
    per_label: BTreeMap<String, Vec<f64>>,
}

impl Accumulator {
    fn push(&mut self, issue: &Issue, days: f64) {
        self.all.push(days);
        let mut seen = Vec::new();
        for label in &issue.labels {
            let key = label.full_label();
            if seen.contains(&key) {
                continue;
            }
            self.per_label.entry(key.clone()).or_default().push(days);
            seen.push(key);
        }
    }

    fn rank(self, limit: usize) -> RankingSection {
        let labels_considered = self.per_label.len();
        let mut labels: Vec<LabelRanking> = self
            .per_label
            .into_iter()
            .filter_map(|(label, values)| {
                Summary::of(&values).map(|summary| LabelRanking { label, summary })
            })
            .collect();
        labels.sort_by(|a, b| {
            b.summary
                .mean
                .total_cmp(&a.summary.mean)
                .then_with(|| a.label.cmp(&b.label))
        });
        labels.truncate(limit);

        RankingSection {
            overall: Summary::of(&self.all),
            labels,
            labels_considered,
        }
    }
}
