//! Aggregations over lifecycle measurements.
//!
//! Every aggregation is a pure function of already-loaded issues plus an
//! `as_of` instant (the snapshot's migration date) and returns a
//! serializable report for the presentation layer:
//!
//! - [`distribution`] - age / time-to-close statistics per bucket
//! - [`trend`] - monthly creation counts per bucket
//! - [`census`] - daily count of simultaneously open issues per bucket
//! - [`ranking`] - slowest and stalest labels
//! - [`activity`] - event totals and top issue creators

pub mod activity;
pub mod census;
pub mod distribution;
pub mod ranking;
pub mod trend;

pub use activity::{ActivityReport, CreatorCount, DEFAULT_CREATOR_LIMIT, activity_report};
pub use census::{CensusReport, CensusSeries, open_census};
pub use distribution::{BucketSummary, DistributionReport, StateDistribution, distribution};
pub use ranking::{
    DEFAULT_RANKING_LIMIT, LabelRanking, RankingReport, RankingSection, lifecycle_ranking,
};
pub use trend::{CATEGORY_TOP_K, LABEL_TOP_K, MonthlyTrend, TrendSeries, monthly_trend};

use schemars::JsonSchema;
use serde::Serialize;

/// Count, mean and median of a set of day values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
}

impl Summary {
    /// Summarize `values`; `None` when empty.
    #[must_use]
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mid = count / 2;
        let median = if count % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Some(Self {
            count,
            mean,
            median,
        })
    }
}
