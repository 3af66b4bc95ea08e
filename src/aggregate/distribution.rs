//! Open-age and time-to-close distributions by bucket.

use super::Summary;
use crate::bucketing::{CutoffFraction, Dimension, Tagged, collapse_long_tail};
use crate::lifecycle::measure;
use crate::model::{Issue, IssueState};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::{debug, info};

/// Statistics for one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct BucketSummary {
    pub bucket: String,
    #[serde(flatten)]
    pub summary: Summary,
}

/// Distribution for one issue state.
///
/// `overall` covers every issue of the state with a valid measurement,
/// labeled or not; `buckets` only covers issues carrying a key along the
/// report's dimension.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct StateDistribution {
    pub state: IssueState,
    /// `"age"` for open issues, `"duration"` for closed ones.
    pub metric: &'static str,
    pub overall: Option<Summary>,
    pub labeled_observations: usize,
    pub buckets: Vec<BucketSummary>,
}

/// Age and duration distributions along one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct DistributionReport {
    pub dimension: Dimension,
    pub cutoff: CutoffFraction,
    pub as_of: DateTime<Utc>,
    pub states: Vec<StateDistribution>,
}

impl DistributionReport {
    #[must_use]
    pub fn state(&self, state: IssueState) -> Option<&StateDistribution> {
        self.states.iter().find(|entry| entry.state == state)
    }
}

/// Compute age (open) and time-to-close (closed) distributions.
///
/// Values are fractional days. Buckets along `dimension` are long-tail
/// collapsed with `cutoff`. Buckets are listed by observation count
/// descending, then name.
pub fn distribution<'a, I>(
    issues: I,
    as_of: DateTime<Utc>,
    dimension: &Dimension,
    cutoff: CutoffFraction,
) -> DistributionReport
where
    I: IntoIterator<Item = &'a Issue>,
{
    info!(dimension = %dimension.describe(), cutoff = cutoff.value(), "Computing lifecycle distribution");

    let mut open: Vec<Tagged<f64>> = Vec::new();
    let mut closed: Vec<Tagged<f64>> = Vec::new();
    let mut unmeasured = 0usize;

    for issue in issues {
        let Some(measurement) = measure(issue, as_of) else {
            unmeasured += 1;
            continue;
        };
        let tagged = Tagged::new(dimension.keys(issue), measurement.days());
        match measurement.state() {
            IssueState::Open => open.push(tagged),
            IssueState::Closed => closed.push(tagged),
        }
    }

    debug!(
        open = open.len(),
        closed = closed.len(),
        unmeasured,
        "Measured issues"
    );

    let states = vec![
        summarize_state(IssueState::Open, &open, cutoff),
        summarize_state(IssueState::Closed, &closed, cutoff),
    ];

    DistributionReport {
        dimension: dimension.clone(),
        cutoff,
        as_of,
        states,
    }
}

fn summarize_state(
    state: IssueState,
    measured: &[Tagged<f64>],
    cutoff: CutoffFraction,
) -> StateDistribution {
    let all_values: Vec<f64> = measured.iter().map(|item| item.value).collect();
    let labeled_observations = measured.iter().map(|item| item.keys.len()).sum();

    let mut buckets: Vec<BucketSummary> = collapse_long_tail(measured, cutoff)
        .into_iter()
        .filter_map(|(bucket, values)| {
            Summary::of(&values).map(|summary| BucketSummary { bucket, summary })
        })
        .collect();
    buckets.sort_by(|a, b| {
        b.summary
            .count
            .cmp(&a.summary.count)
            .then_with(|| a.bucket.cmp(&b.bucket))
    });

    StateDistribution {
        state,
        metric: match state {
            IssueState::Open => "age",
            IssueState::Closed => "duration",
        },
        overall: Summary::of(&all_values),
        labeled_observations,
        buckets,
    }
}
