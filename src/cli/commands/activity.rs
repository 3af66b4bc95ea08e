//! Activity command implementation.

use super::{emit, label_width, print_no_data, scoped_issues};
use crate::aggregate::{ActivityReport, activity_report};
use crate::config::Settings;
use crate::error::Result;
use crate::format::{OutputContext, TextTable};
use crate::repository::Repository;
use std::fmt::Write as _;

/// Execute the activity command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded or the year is invalid.
pub fn execute(settings: &Settings, repo: &Repository, ctx: &OutputContext) -> Result<()> {
    let issues = scoped_issues(repo, settings)?;
    if issues.is_empty() {
        return print_no_data(ctx, "no issues in scope");
    }

    let report = activity_report(issues, settings.user.as_deref(), settings.creator_limit);
    emit(ctx, &report, render_text)
}

fn render_text(report: &ActivityReport, ctx: &OutputContext) -> String {
    let mut out = String::new();
    match &report.user {
        Some(user) => {
            let _ = writeln!(out, "Events by {user}: {}", report.total_events);
        }
        None => {
            let _ = writeln!(out, "Total events: {}", report.total_events);
        }
    }
    let _ = writeln!(
        out,
        "Issues: {} from {} creator(s)",
        report.issues, report.distinct_creators
    );

    if !report.top_creators.is_empty() {
        let mut table =
            TextTable::new(["creator", "issues"]).with_max_first_column(label_width(ctx, 16));
        for entry in &report.top_creators {
            table.push_row([entry.creator.clone(), entry.issues.to_string()]);
        }
        let _ = writeln!(out, "\nTop creators:");
        out.push_str(&table.render());
    }
    out
}
