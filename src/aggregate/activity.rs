//! Event totals and the most prolific issue creators.

use crate::model::Issue;
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Default number of creators listed.
pub const DEFAULT_CREATOR_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct CreatorCount {
    pub creator: String,
    pub issues: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ActivityReport {
    /// Author the event total is restricted to, if any.
    pub user: Option<String>,
    pub total_events: usize,
    pub issues: usize,
    pub distinct_creators: usize,
    pub top_creators: Vec<CreatorCount>,
}

/// Count timeline events and rank issue creators.
///
/// With `user` set, only events authored by that user are counted; the
/// creator ranking always covers every issue. Creators are ordered by issue
/// count descending, then name. Issues with an empty creator are not ranked.
pub fn activity_report<'a, I>(issues: I, user: Option<&str>, limit: usize) -> ActivityReport
where
    I: IntoIterator<Item = &'a Issue>,
{
    info!(user = user.unwrap_or("<all>"), limit, "Computing activity report");

    let mut total_events = 0usize;
    let mut issue_count = 0usize;
    let mut per_creator: BTreeMap<&str, usize> = BTreeMap::new();

    for issue in issues {
        issue_count += 1;
        total_events += issue
            .events
            .iter()
            .filter(|event| user.is_none_or(|name| event.author.as_deref() == Some(name)))
            .count();
        if !issue.creator.is_empty() {
            *per_creator.entry(issue.creator.as_str()).or_insert(0) += 1;
        }
    }

    let distinct_creators = per_creator.len();
    let mut top_creators: Vec<CreatorCount> = per_creator
        .into_iter()
        .map(|(creator, issues)| CreatorCount {
            creator: creator.to_string(),
            issues,
        })
        .collect();
    top_creators.sort_by(|a, b| {
        b.issues
            .cmp(&a.issues)
            .then_with(|| a.creator.cmp(&b.creator))
    });
    top_creators.truncate(limit);

    ActivityReport {
        user: user.map(str::to_string),
        total_events,
        issues: issue_count,
        distinct_creators,
        top_creators,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Event, EventKind, IssueState};
    use chrono::{TimeZone, Utc};

    fn issues() -> Vec<Issue> {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        vec![
            Issue::new(IssueState::Open, at)
                .with_creator("carol")
                .with_events(vec![
                    Event::new(EventKind::parse("labeled"), Some(at)).with_author("alice"),
                    Event::new(EventKind::Closed, Some(at)).with_author("bob"),
                ]),
            Issue::new(IssueState::Open, at)
                .with_creator("alice")
                .with_events(vec![Event::new(EventKind::parse("commented"), None)
                    .with_author("alice")]),
            Issue::new(IssueState::Open, at).with_creator("carol"),
            Issue::new(IssueState::Open, at),
        ]
    }

    #[test]
    fn counts_all_events_without_user() {
        let report = activity_report(&issues(), None, DEFAULT_CREATOR_LIMIT);
        assert_eq!(report.total_events, 3);
        assert_eq!(report.issues, 4);
        assert_eq!(report.distinct_creators, 2);
        assert_eq!(
            report.top_creators,
            vec![
                CreatorCount {
                    creator: "carol".into(),
                    issues: 2
                },
                CreatorCount {
                    creator: "alice".into(),
                    issues: 1
                },
            ]
        );
    }

    #[test]
    fn user_filter_restricts_event_count() {
        let report = activity_report(&issues(), Some("alice"), 1);
        assert_eq!(report.total_events, 2);
        assert_eq!(report.user.as_deref(), Some("alice"));
        assert_eq!(report.top_creators.len(), 1);
        assert_eq!(report.top_creators[0].creator, "carol");
    }
}
