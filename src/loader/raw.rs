//! Raw JSON shapes accepted in a snapshot, and their conversion into the
//! canonical [`model`](crate::model) records.
//!
//! Everything that varies between exports (key aliases, string-or-object
//! labels, `null` collections, malformed timestamps) is resolved here so the
//! analysis code only ever sees [`Issue`].

use crate::error::{MetricsError, Result};
use crate::model::{Event, EventKind, Issue, IssueState, Label, sort_events};
use crate::util::parse_timestamp;
use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

#[derive(Debug, Deserialize)]
pub(crate) struct RawIssue {
    #[serde(default)]
    number: Option<Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    creator: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default, alias = "created_at")]
    created_date: Option<String>,
    #[serde(default, alias = "updated_at")]
    updated_date: Option<String>,
    #[serde(default, alias = "closed_at")]
    closed_date: Option<String>,
    #[serde(default)]
    labels: Option<Vec<RawLabel>>,
    #[serde(default, alias = "event_list")]
    events: Option<Vec<Value>>,
}

/// A label is either its bare name or an object carrying `name`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawLabel {
    Name(String),
    Object { name: Option<String> },
    Unsupported(Value),
}

impl RawLabel {
    fn into_name(self) -> Option<String> {
        match self {
            Self::Name(name) | Self::Object { name: Some(name) } if !name.is_empty() => {
                Some(name)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    event_type: Option<String>,
    #[serde(default, alias = "created_at")]
    event_date: Option<String>,
    #[serde(default)]
    author: Option<String>,
}

/// Outcome of adapting one raw issue.
#[derive(Debug)]
pub(crate) struct Adapted {
    pub issue: Issue,
    pub dropped_events: usize,
    pub undated_events: usize,
}

/// Convert the raw JSON value at `index` into an [`Issue`].
///
/// # Errors
///
/// Returns [`MetricsError::MalformedRecord`] when the value is not an issue
/// object, lacks a parseable `created_date`, or carries an unknown state.
pub(crate) fn adapt_issue(index: usize, value: Value, separator: &str) -> Result<Adapted> {
    if !value.is_object() {
        return Err(MetricsError::malformed(index, "expected a JSON object"));
    }

    let raw: RawIssue =
        serde_json::from_value(value).map_err(|e| MetricsError::malformed(index, e.to_string()))?;

    let created_date = raw
        .created_date
        .as_deref()
        .and_then(parse_timestamp)
        .ok_or_else(|| MetricsError::malformed(index, "missing or unparseable created_date"))?;
    let closed_date = raw.closed_date.as_deref().and_then(parse_timestamp);
    let updated_date = raw.updated_date.as_deref().and_then(parse_timestamp);

    let state = match raw.state.as_deref() {
        Some(state) => state
            .parse::<IssueState>()
            .map_err(|reason| MetricsError::malformed(index, reason))?,
        None if closed_date.is_some() => IssueState::Closed,
        None => IssueState::Open,
    };

    let labels = raw
        .labels
        .unwrap_or_default()
        .into_iter()
        .filter_map(RawLabel::into_name)
        .map(|name| Label::with_separator(name, separator))
        .collect();

    let mut dropped_events = 0;
    let mut undated_events = 0;
    let mut events = Vec::new();
    for raw_event in raw.events.unwrap_or_default() {
        match serde_json::from_value::<RawEvent>(raw_event) {
            Ok(raw_event) => {
                let event = adapt_event(raw_event);
                if event.event_date.is_none() {
                    undated_events += 1;
                }
                events.push(event);
            }
            Err(err) => {
                trace!(index, error = %err, "Dropping malformed event");
                dropped_events += 1;
            }
        }
    }
    sort_events(&mut events);

    let issue = Issue {
        number: raw.number.as_ref().and_then(number_from_value),
        title: raw.title,
        url: raw.url,
        creator: raw.creator.unwrap_or_default(),
        state,
        created_date,
        updated_date,
        closed_date,
        labels,
        events,
    };

    Ok(Adapted {
        issue,
        dropped_events,
        undated_events,
    })
}

fn adapt_event(raw: RawEvent) -> Event {
    Event {
        kind: EventKind::parse(raw.event_type.as_deref().unwrap_or_default()),
        event_date: raw.event_date.as_deref().and_then(parse_timestamp),
        author: raw.author,
    }
}

fn number_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn adapts_string_and_object_labels() {
        let value = json!({
            "created_date": "2024-01-01T00:00:00Z",
            "state": "open",
            "labels": ["kind:bug", {"name": "area:ui"}, {"color": "red"}, 42, ""],
        });
        let adapted = adapt_issue(0, value, ":").unwrap();
        let names: Vec<_> = adapted.issue.labels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["kind:bug", "area:ui"]);
    }

    #[test]
    fn accepts_alias_keys_and_null_collections() {
        let value = json!({
            "created_at": "2024-01-01T00:00:00Z",
            "closed_at": "2024-01-03T00:00:00Z",
            "labels": null,
            "event_list": null,
        });
        let adapted = adapt_issue(3, value, ":").unwrap();
        assert_eq!(adapted.issue.state, IssueState::Closed);
        assert_eq!(
            adapted.issue.closed_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap())
        );
        assert!(adapted.issue.labels.is_empty());
        assert!(adapted.issue.events.is_empty());
    }

    #[test]
    fn malformed_event_dates_are_kept_undated() {
        let value = json!({
            "created_date": "2024-01-01T00:00:00Z",
            "state": "closed",
            "events": [
                {"event_type": "closed", "event_date": "not a date", "author": "a"},
                {"event_type": "Closed", "event_date": "2024-01-02T00:00:00Z"},
                {"event_type": "closed", "event_date": 17},
            ],
        });
        let adapted = adapt_issue(0, value, ":").unwrap();
        assert_eq!(adapted.issue.events.len(), 2);
        assert_eq!(adapted.undated_events, 1);
        assert_eq!(adapted.dropped_events, 1);
        assert_eq!(adapted.issue.events[0].kind, EventKind::Closed);
        assert!(adapted.issue.events[0].event_date.is_some());
    }

    #[test]
    fn missing_created_date_is_malformed() {
        let err = adapt_issue(7, json!({"state": "open"}), ":").unwrap_err();
        assert!(matches!(err, MetricsError::MalformedRecord { index: 7, .. }));
    }

    #[test]
    fn unknown_state_is_malformed() {
        let value = json!({"created_date": "2024-01-01", "state": "merged"});
        assert!(adapt_issue(0, value, ":").is_err());
    }

    #[test]
    fn non_object_is_malformed() {
        assert!(adapt_issue(0, json!("issue"), ":").is_err());
    }

    #[test]
    fn number_accepts_strings() {
        let value = json!({"created_date": "2024-01-01", "number": "1234"});
        let adapted = adapt_issue(0, value, ":").unwrap();
        assert_eq!(adapted.issue.number, Some(1234));
        assert_eq!(adapted.issue.state, IssueState::Open);
    }
}
