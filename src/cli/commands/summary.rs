//! Summary command implementation.
//!
//! Shows what was loaded: issue counts by state, closed issues whose closing
//! date cannot be derived, the migration date, label categories, year range
//! and any records the loader dropped.

use super::{emit, scoped_issues};
use crate::config::Settings;
use crate::error::{MetricsError, Result};
use crate::format::{OutputContext, TextTable};
use crate::lifecycle::effective_closed_date;
use crate::loader::{SkippedRecord, SnapshotFormat};
use crate::model::IssueState;
use crate::repository::Repository;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SummaryReport {
    pub source: Option<PathBuf>,
    pub format: SnapshotFormat,
    /// Year filter applied to the counts, if any.
    pub year: Option<String>,
    pub issues: usize,
    pub open: usize,
    pub closed: usize,
    /// Closed issues with neither a closed date nor an unreopened close event.
    pub unresolved_closed: usize,
    pub migration_date: Option<DateTime<Utc>>,
    pub categories: Vec<String>,
    pub year_range: Vec<String>,
    pub skipped_records: Vec<SkippedRecord>,
    pub dropped_events: usize,
    pub undated_events: usize,
}

/// Execute the summary command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded or the year is invalid.
pub fn execute(settings: &Settings, repo: &Repository, ctx: &OutputContext) -> Result<()> {
    debug!("Summarizing snapshot");
    let report = compute_summary(settings, repo)?;
    emit(ctx, &report, |report, _| render_text(report))
}

/// Collect the summary without printing it.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded or the year is invalid.
pub fn compute_summary(settings: &Settings, repo: &Repository) -> Result<SummaryReport> {
    let issues = scoped_issues(repo, settings)?;
    let load = repo.load_report()?;

    let open = issues.iter().filter(|issue| issue.is_open()).count();
    let closed = issues.len() - open;
    let unresolved_closed = issues
        .iter()
        .filter(|issue| issue.state == IssueState::Closed && effective_closed_date(issue).is_none())
        .count();

    let migration_date = optional_fact(repo.get_migration_date())?;
    let year_range = optional_fact(repo.get_year_range().map(<[String]>::to_vec))?.unwrap_or_default();

    Ok(SummaryReport {
        source: load.path.clone(),
        format: load.format,
        year: settings.year.clone(),
        issues: issues.len(),
        open,
        closed,
        unresolved_closed,
        migration_date,
        categories: repo.get_label_categories()?.iter().cloned().collect(),
        year_range,
        skipped_records: load.skipped.clone(),
        dropped_events: load.dropped_events,
        undated_events: load.undated_events,
    })
}

/// An empty dataset leaves a fact unset instead of failing the summary.
fn optional_fact<T>(fact: Result<T>) -> Result<Option<T>> {
    match fact {
        Ok(value) => Ok(Some(value)),
        Err(MetricsError::EmptyDataset { .. }) => Ok(None),
        Err(other) => Err(other),
    }
}

fn render_text(report: &SummaryReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Issue Snapshot Summary\n");
    if let Some(path) = &report.source {
        let _ = writeln!(out, "  Source:            {}", path.display());
    }
    if let Some(year) = &report.year {
        let _ = writeln!(out, "  Year:              {year}");
    }

    let mut counts = TextTable::new(["state", "issues"]);
    counts.push_row(["open".to_string(), report.open.to_string()]);
    counts.push_row(["closed".to_string(), report.closed.to_string()]);
    counts.push_row(["total".to_string(), report.issues.to_string()]);
    let _ = writeln!(out);
    out.push_str(&counts.render());

    if report.unresolved_closed > 0 {
        let _ = writeln!(
            out,
            "\n  {} closed issue(s) have no derivable closing date",
            report.unresolved_closed
        );
    }

    let _ = writeln!(out);
    match report.migration_date {
        Some(date) => {
            let _ = writeln!(out, "  Migration date:    {}", date.to_rfc3339());
        }
        None => {
            let _ = writeln!(out, "  Migration date:    (no dated events)");
        }
    }
    if let (Some(first), Some(last)) = (report.year_range.first(), report.year_range.last()) {
        let _ = writeln!(out, "  Years:             {first}-{last}");
    }
    if report.categories.is_empty() {
        let _ = writeln!(out, "  Categories:        (none)");
    } else {
        let _ = writeln!(out, "  Categories:        {}", report.categories.join(", "));
    }

    if !report.skipped_records.is_empty() || report.dropped_events > 0 {
        let _ = writeln!(
            out,
            "\nSkipped {} record(s) and {} event(s):",
            report.skipped_records.len(),
            report.dropped_events
        );
        for skipped in &report.skipped_records {
            let _ = writeln!(out, "  #{}: {}", skipped.index, skipped.reason);
        }
    }
    out
}
