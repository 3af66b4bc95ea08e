//! Effective closed dates and per-issue lifecycle metrics.
//!
//! When a snapshot does not record `closed_date`, the closing time is
//! reconstructed from the event timeline:
//!
//! - no `closed` event: unknown;
//! - a `reopened`/`reopen` event at or after the last `closed`: unknown,
//!   the issue was reopened (reopen wins ties);
//! - otherwise: the last `closed` event.
//!
//! Events without a date are ignored.

use crate::model::{Event, EventKind, Issue, IssueState};
use crate::util::elapsed_days;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Resolver state while scanning a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    /// No unreopened `closed` event seen so far.
    NoClosedEvent,
    /// A `closed` event was seen; a later reopen may still cancel it.
    ClosedPendingReopenCheck(DateTime<Utc>),
    /// Terminal: the timeline ends closed at this instant.
    ResolvedClosed(DateTime<Utc>),
}

impl ResolverState {
    fn step(self, kind: &EventKind, at: DateTime<Utc>) -> Self {
        match (self, kind) {
            (_, EventKind::Closed) => Self::ClosedPendingReopenCheck(at),
            (Self::ClosedPendingReopenCheck(closed_at), EventKind::Reopened) if at >= closed_at => {
                Self::NoClosedEvent
            }
            (state, _) => state,
        }
    }

    fn finish(self) -> Self {
        match self {
            Self::ClosedPendingReopenCheck(at) => Self::ResolvedClosed(at),
            other => other,
        }
    }

    /// The resolved closing instant, if the scan ended closed.
    #[must_use]
    pub const fn closed_at(self) -> Option<DateTime<Utc>> {
        match self {
            Self::ResolvedClosed(at) => Some(at),
            Self::NoClosedEvent | Self::ClosedPendingReopenCheck(_) => None,
        }
    }
}

/// Run the resolver over `events` and return its terminal state.
///
/// Events are considered in date order; at equal timestamps a `closed` event
/// is processed before a reopen so the reopen wins.
#[must_use]
pub fn resolve_state(events: &[Event]) -> ResolverState {
    let mut timeline: Vec<(DateTime<Utc>, &EventKind)> = events
        .iter()
        .filter_map(|event| match (&event.kind, event.event_date) {
            (EventKind::Closed | EventKind::Reopened, Some(at)) => Some((at, &event.kind)),
            _ => None,
        })
        .collect();
    timeline.sort_by(|(a_at, a_kind), (b_at, b_kind)| {
        a_at.cmp(b_at).then_with(|| kind_rank(a_kind).cmp(&kind_rank(b_kind)))
    });

    timeline
        .into_iter()
        .fold(ResolverState::NoClosedEvent, |state, (at, kind)| {
            state.step(kind, at)
        })
        .finish()
}

const fn kind_rank(kind: &EventKind) -> u8 {
    match kind {
        EventKind::Closed => 0,
        EventKind::Reopened => 1,
        EventKind::Other(_) => 2,
    }
}

/// Closing instant inferred from the event timeline alone.
#[must_use]
pub fn closed_date_from_events(events: &[Event]) -> Option<DateTime<Utc>> {
    resolve_state(events).closed_at()
}

/// Closed date used for duration math: explicit if recorded, else inferred.
#[must_use]
pub fn effective_closed_date(issue: &Issue) -> Option<DateTime<Utc>> {
    issue
        .closed_date
        .or_else(|| closed_date_from_events(&issue.events))
}

/// Lifecycle measurement for one issue, in fractional days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    /// Open issue: age at `as_of`.
    Age(f64),
    /// Closed issue: created to effective closed date.
    Duration(f64),
}

impl Measurement {
    #[must_use]
    pub const fn days(self) -> f64 {
        match self {
            Self::Age(days) | Self::Duration(days) => days,
        }
    }

    #[must_use]
    pub const fn state(self) -> IssueState {
        match self {
            Self::Age(_) => IssueState::Open,
            Self::Duration(_) => IssueState::Closed,
        }
    }
}

/// Measure an issue's age (open) or time-to-close (closed).
///
/// `as_of` is the reference instant for open issues, normally the snapshot's
/// migration date. Returns `None` for closed issues without a derivable
/// closed date and for negative spans, which are excluded rather than
/// clamped.
#[must_use]
pub fn measure(issue: &Issue, as_of: DateTime<Utc>) -> Option<Measurement> {
    let measurement = match issue.state {
        IssueState::Open => Measurement::Age(elapsed_days(issue.created_date, as_of)),
        IssueState::Closed => {
            let closed = effective_closed_date(issue)?;
            Measurement::Duration(elapsed_days(issue.created_date, closed))
        }
    };

    match measurement.days().partial_cmp(&0.0) {
        Some(Ordering::Greater | Ordering::Equal) => Some(measurement),
        _ => None,
    }
}

/// Instant at which an issue stopped being open, for open-issue census math.
///
/// Open issues use `as_of`; closed issues need a derivable closed date.
#[must_use]
pub fn open_until(issue: &Issue, as_of: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match issue.state {
        IssueState::Open => Some(as_of),
        IssueState::Closed => effective_closed_date(issue),
    }
}
