//! Monthly creation counts per bucket.

use crate::bucketing::{Dimension, top_k};
use crate::model::Issue;
use crate::util::month_key;
use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Default number of series for a category trend.
pub const CATEGORY_TOP_K: usize = 6;
/// Default number of series for a raw-label trend.
pub const LABEL_TOP_K: usize = 10;

/// Monthly counts for one retained bucket, aligned with [`MonthlyTrend::months`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct TrendSeries {
    pub bucket: String,
    pub total: usize,
    pub counts: Vec<usize>,
}

/// Issues created per month, split by bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct MonthlyTrend {
    pub dimension: Dimension,
    pub top_k: usize,
    /// Contiguous `YYYY-MM` axis from the first to the last counted month.
    pub months: Vec<String>,
    /// Retained buckets, most frequent first.
    pub series: Vec<TrendSeries>,
    pub issues_counted: usize,
    /// Buckets left out because they fell outside the top K.
    pub omitted_buckets: usize,
}

impl MonthlyTrend {
    /// Count for `bucket` in `month`, zero when the bucket was not retained.
    #[must_use]
    pub fn count(&self, bucket: &str, month: &str) -> usize {
        let Some(index) = self.months.iter().position(|m| m == month) else {
            return 0;
        };
        self.series
            .iter()
            .find(|series| series.bucket == bucket)
            .map_or(0, |series| series.counts[index])
    }
}

/// Count issues created per calendar month for the `k` busiest buckets.
///
/// Each issue adds one to every distinct bucket it carries in its creation
/// month. Buckets outside the top `k` (by total, ties by name) are dropped,
/// not folded into "other".
pub fn monthly_trend<'a, I>(issues: I, dimension: &Dimension, k: usize) -> MonthlyTrend
where
    I: IntoIterator<Item = &'a Issue>,
{
    info!(dimension = %dimension.describe(), top_k = k, "Computing monthly trend");

    let mut per_month: BTreeMap<NaiveDate, BTreeMap<String, usize>> = BTreeMap::new();
    let mut totals: BTreeMap<String, usize> = BTreeMap::new();
    let mut issues_counted = 0usize;

    for issue in issues {
        let keys = dimension.keys(issue);
        if keys.is_empty() {
            continue;
        }
        issues_counted += 1;
        let month = month_start(issue.created_date.date_naive());
        let counts = per_month.entry(month).or_default();
        for key in keys {
            *counts.entry(key.clone()).or_insert(0) += 1;
            *totals.entry(key).or_insert(0) += 1;
        }
    }

    let months = match (per_month.keys().next(), per_month.keys().next_back()) {
        (Some(first), Some(last)) => month_axis(*first, *last),
        _ => Vec::new(),
    };

    let retained = top_k(&totals, k);
    let series = retained
        .into_iter()
        .map(|bucket| {
            let counts = months
                .iter()
                .map(|month| {
                    per_month
                        .get(month)
                        .and_then(|counts| counts.get(&bucket))
                        .copied()
                        .unwrap_or(0)
                })
                .collect();
            TrendSeries {
                total: totals.get(&bucket).copied().unwrap_or(0),
                bucket,
                counts,
            }
        })
        .collect::<Vec<_>>();

    let omitted_buckets = totals.len().saturating_sub(series.len());
    debug!(
        months = months.len(),
        buckets = totals.len(),
        omitted_buckets,
        "Built monthly trend"
    );

    MonthlyTrend {
        dimension: dimension.clone(),
        top_k: k,
        months: months.iter().map(month_key).collect(),
        series,
        issues_counted,
        omitted_buckets,
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn next_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn month_axis(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    let mut months = Vec::new();
    let mut cursor = Some(first);
    while let Some(month) = cursor {
        if month > last {
            break;
        }
        months.push(month);
        cursor = next_month(month);
    }
    months
}
