//! Daily census of simultaneously open issues per bucket.

use crate::bucketing::{CutoffFraction, Dimension, Tagged, relabel_long_tail};
use crate::lifecycle::open_until;
use crate::model::Issue;
use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Daily open counts for one bucket, aligned with [`CensusReport::days`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct CensusSeries {
    pub bucket: String,
    pub counts: Vec<usize>,
}

/// How many issues of each bucket were open on each day.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CensusReport {
    pub dimension: Dimension,
    pub cutoff: CutoffFraction,
    pub as_of: DateTime<Utc>,
    pub days: Vec<NaiveDate>,
    pub series: Vec<CensusSeries>,
    pub issues_counted: usize,
}

impl CensusReport {
    /// Open count for `bucket` on `day`; zero outside the grid.
    #[must_use]
    pub fn open_on(&self, bucket: &str, day: NaiveDate) -> usize {
        let (Some(first), Some(last)) = (self.days.first(), self.days.last()) else {
            return 0;
        };
        if day < *first || day > *last {
            return 0;
        }
        let Ok(index) = usize::try_from((day - *first).num_days()) else {
            return 0;
        };
        self.series
            .iter()
            .find(|series| series.bucket == bucket)
            .map_or(0, |series| series.counts[index])
    }
}

/// Count, for every day in the dataset, the issues open in each bucket.
///
/// The grid runs from the earliest creation day of any issue passed in to
/// the latest counted end day. An issue is open from its creation day
/// through its end day inclusive.
/// The end is the effective closed date for closed issues and `as_of` for
/// open ones. Closed issues without a derivable closed date, issues ending
/// before they start, and issues without a key are left out. Buckets are
/// long-tail collapsed with `cutoff`.
pub fn open_census<'a, I>(
    issues: I,
    as_of: DateTime<Utc>,
    dimension: &Dimension,
    cutoff: CutoffFraction,
) -> CensusReport
where
    I: IntoIterator<Item = &'a Issue>,
{
    info!(dimension = %dimension.describe(), cutoff = cutoff.value(), "Computing open-issue census");

    let mut spans: Vec<Tagged<(NaiveDate, NaiveDate)>> = Vec::new();
    let mut earliest_created: Option<NaiveDate> = None;
    for issue in issues {
        let created_day = issue.created_date.date_naive();
        earliest_created = Some(earliest_created.map_or(created_day, |day| day.min(created_day)));

        let keys = dimension.keys(issue);
        if keys.is_empty() {
            continue;
        }
        let Some(end) = open_until(issue, as_of) else {
            continue;
        };
        let end_day = end.date_naive();
        if end_day < created_day {
            continue;
        }
        spans.push(Tagged::new(keys, (created_day, end_day)));
    }

    let spans = relabel_long_tail(&spans, cutoff);
    let (Some(first), Some(last)) = (
        earliest_created,
        spans.iter().map(|span| span.value.1).max(),
    ) else {
        return CensusReport {
            dimension: dimension.clone(),
            cutoff,
            as_of,
            days: Vec::new(),
            series: Vec::new(),
            issues_counted: 0,
        };
    };

    let days: Vec<NaiveDate> = first.iter_days().take_while(|day| *day <= last).collect();
    let len = days.len();

    // Difference arrays: +1 on the start day, -1 the day after the end.
    let mut deltas: BTreeMap<&str, Vec<i64>> = BTreeMap::new();
    for span in &spans {
        let (start, end) = span.value;
        let start_index = day_index(first, start);
        let end_index = day_index(first, end);
        for key in &span.keys {
            let delta = deltas.entry(key.as_str()).or_insert_with(|| vec![0; len + 1]);
            delta[start_index] += 1;
            delta[end_index + 1] -= 1;
        }
    }

    let series: Vec<CensusSeries> = deltas
        .into_iter()
        .map(|(bucket, delta)| {
            let mut running = 0i64;
            let counts = delta[..len]
                .iter()
                .map(|change| {
                    running += change;
                    usize::try_from(running).unwrap_or(0)
                })
                .collect();
            CensusSeries {
                bucket: bucket.to_string(),
                counts,
            }
        })
        .collect();

    debug!(days = len, buckets = series.len(), issues = spans.len(), "Built open-issue census");

    CensusReport {
        dimension: dimension.clone(),
        cutoff,
        as_of,
        days,
        series,
        issues_counted: spans.len(),
    }
}

fn day_index(first: NaiveDate, day: NaiveDate) -> usize {
    usize::try_from((day - first).num_days()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Event, EventKind, IssueState};
    use chrono::TimeZone;

    fn at(m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, m, d, 8, 30, 0).unwrap()
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, d).unwrap()
    }

    fn kind() -> Dimension {
        Dimension::Category("kind".into())
    }

    #[test]
    fn closed_issue_is_open_through_its_closing_day() {
        let issue = Issue::new(IssueState::Closed, at(1, 1))
            .with_labels(["kind:bug"])
            .with_closed_date(at(1, 5));
        let report = open_census([&issue], at(1, 10), &kind(), CutoffFraction::CENSUS);

        for d in 1..=5 {
            assert_eq!(report.open_on("bug", date(1, d)), 1, "day {d}");
        }
        assert_eq!(report.open_on("bug", date(1, 6)), 0);
        assert_eq!(report.days.first(), Some(&date(1, 1)));
        assert_eq!(report.days.last(), Some(&date(1, 5)));
    }

    #[test]
    fn open_issues_run_until_as_of() {
        let closed = Issue::new(IssueState::Closed, at(1, 1))
            .with_labels(["kind:bug"])
            .with_events(vec![Event::new(EventKind::Closed, Some(at(1, 3)))]);
        let open = Issue::new(IssueState::Open, at(1, 2)).with_labels(["kind:bug"]);
        let report = open_census([&closed, &open], at(1, 6), &kind(), CutoffFraction::CENSUS);

        assert_eq!(report.days.len(), 6);
        assert_eq!(report.series[0].counts, vec![1, 2, 2, 1, 1, 1]);
        assert_eq!(report.issues_counted, 2);
    }

    #[test]
    fn multi_bucket_issue_counts_in_each() {
        let issue = Issue::new(IssueState::Open, at(1, 1)).with_labels(["kind:bug", "kind:ui"]);
        let report = open_census([&issue], at(1, 2), &kind(), CutoffFraction::CENSUS);
        assert_eq!(report.open_on("bug", date(1, 2)), 1);
        assert_eq!(report.open_on("ui", date(1, 2)), 1);
    }

    #[test]
    fn excludes_unresolved_unlabeled_and_negative() {
        let unresolved = Issue::new(IssueState::Closed, at(1, 1)).with_labels(["kind:bug"]);
        let unlabeled = Issue::new(IssueState::Open, at(1, 1));
        let negative = Issue::new(IssueState::Closed, at(1, 5))
            .with_labels(["kind:bug"])
            .with_closed_date(at(1, 2));
        let report = open_census(
            [&unresolved, &unlabeled, &negative],
            at(1, 9),
            &kind(),
            CutoffFraction::CENSUS,
        );
        assert!(report.days.is_empty());
        assert!(report.series.is_empty());
        assert_eq!(report.issues_counted, 0);
    }

    #[test]
    fn grid_starts_at_earliest_creation_even_if_uncounted() {
        let unlabeled = Issue::new(IssueState::Open, at(1, 1));
        let bug = Issue::new(IssueState::Open, at(1, 3)).with_labels(["kind:bug"]);
        let report = open_census([&unlabeled, &bug], at(1, 4), &kind(), CutoffFraction::CENSUS);

        assert_eq!(report.days.first(), Some(&date(1, 1)));
        assert_eq!(report.days.last(), Some(&date(1, 4)));
        assert_eq!(report.series[0].counts, vec![0, 0, 1, 1]);
        assert_eq!(report.issues_counted, 1);
    }

    #[test]
    fn rare_buckets_fold_into_other() {
        let mut issues: Vec<Issue> = (0..60)
            .map(|_| Issue::new(IssueState::Open, at(1, 1)).with_labels(["kind:bug"]))
            .collect();
        issues.push(Issue::new(IssueState::Open, at(1, 1)).with_labels(["kind:rare"]));
        let report = open_census(&issues, at(1, 1), &kind(), CutoffFraction::CENSUS);
        let buckets: Vec<_> = report.series.iter().map(|s| s.bucket.as_str()).collect();
        assert_eq!(buckets, vec!["bug", "other"]);
        assert_eq!(report.open_on("other", date(1, 1)), 1);
    }
}
