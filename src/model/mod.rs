//! Typed records built from the issue snapshot.
//!
//! Records are constructed once by the [`loader`](crate::loader) and never
//! mutated afterwards. Derived values (effective closed date, bucket keys)
//! are computed by the analysis modules from these read-only views.

mod label;

pub use label::{DEFAULT_LABEL_SEPARATOR, Label};

use chrono::{DateTime, Datelike, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Issue state as recorded in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" | "opened" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(format!("unknown issue state '{other}'")),
        }
    }
}

/// Event type, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Closed,
    Reopened,
    Other(String),
}

impl EventKind {
    /// Classify a raw event type string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        match lowered.as_str() {
            "closed" => Self::Closed,
            "reopened" | "reopen" => Self::Reopened,
            _ => Self::Other(lowered),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Closed => "closed",
            Self::Reopened => "reopened",
            Self::Other(kind) => kind,
        }
    }
}

/// One entry in an issue's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Event {
    pub kind: EventKind,
    pub event_date: Option<DateTime<Utc>>,
    pub author: Option<String>,
}

impl Event {
    #[must_use]
    pub fn new(kind: EventKind, event_date: Option<DateTime<Utc>>) -> Self {
        Self {
            kind,
            event_date,
            author: None,
        }
    }

    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// An issue from the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Issue {
    pub number: Option<u64>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub creator: String,
    pub state: IssueState,
    pub created_date: DateTime<Utc>,
    pub updated_date: Option<DateTime<Utc>>,
    pub closed_date: Option<DateTime<Utc>>,
    pub labels: Vec<Label>,
    /// Sorted by `event_date`; undated events keep their relative order at the end.
    pub events: Vec<Event>,
}

impl Issue {
    /// Minimal issue, mostly useful for tests and embedding.
    #[must_use]
    pub fn new(state: IssueState, created_date: DateTime<Utc>) -> Self {
        Self {
            number: None,
            title: None,
            url: None,
            creator: String::new(),
            state,
            created_date,
            updated_date: None,
            closed_date: None,
            labels: Vec::new(),
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_labels<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = names.into_iter().map(Label::new).collect();
        self
    }

    #[must_use]
    pub fn with_events(mut self, events: Vec<Event>) -> Self {
        self.events = events;
        sort_events(&mut self.events);
        self
    }

    #[must_use]
    pub fn with_closed_date(mut self, closed_date: DateTime<Utc>) -> Self {
        self.closed_date = Some(closed_date);
        self
    }

    #[must_use]
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, IssueState::Open)
    }

    /// Year the issue was created.
    #[must_use]
    pub fn created_year(&self) -> i32 {
        self.created_date.year()
    }

    /// Labels whose category equals `category`.
    pub fn labels_in<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Label> + 'a {
        self.labels.iter().filter(move |label| label.in_category(category))
    }

    /// Latest dated event in this issue's timeline.
    #[must_use]
    pub fn latest_event_date(&self) -> Option<DateTime<Utc>> {
        self.events.iter().filter_map(|event| event.event_date).max()
    }
}

/// Order events chronologically; undated events go last, stable otherwise.
pub(crate) fn sort_events(events: &mut [Event]) {
    events.sort_by_key(|event| (event.event_date.is_none(), event.event_date));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn event_kind_is_case_insensitive() {
        assert_eq!(EventKind::parse("CLOSED"), EventKind::Closed);
        assert_eq!(EventKind::parse("Reopen"), EventKind::Reopened);
        assert_eq!(EventKind::parse("reopened"), EventKind::Reopened);
        assert_eq!(
            EventKind::parse("Labeled"),
            EventKind::Other("labeled".to_string())
        );
    }

    #[test]
    fn issue_state_parse() {
        assert_eq!("OPEN".parse::<IssueState>().unwrap(), IssueState::Open);
        assert_eq!("closed".parse::<IssueState>().unwrap(), IssueState::Closed);
        assert!("merged".parse::<IssueState>().is_err());
    }

    #[test]
    fn events_sorted_with_undated_last() {
        let issue = Issue::new(IssueState::Open, ts(1)).with_events(vec![
            Event::new(EventKind::Other("commented".into()), None),
            Event::new(EventKind::Closed, Some(ts(5))),
            Event::new(EventKind::Reopened, Some(ts(3))),
        ]);
        let dates: Vec<_> = issue.events.iter().map(|e| e.event_date).collect();
        assert_eq!(dates, vec![Some(ts(3)), Some(ts(5)), None]);
        assert_eq!(issue.latest_event_date(), Some(ts(5)));
    }

    #[test]
    fn labels_in_filters_by_category() {
        let issue = Issue::new(IssueState::Open, ts(1)).with_labels(["kind:bug", "area:ui", "kind:docs"]);
        let kinds: Vec<_> = issue
            .labels_in("kind")
            .filter_map(|label| label.sublabel.as_deref())
            .collect();
        assert_eq!(kinds, vec!["bug", "docs"]);
    }
}
