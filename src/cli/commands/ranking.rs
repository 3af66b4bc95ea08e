//! Ranking command implementation.

use super::{emit, label_width, print_no_data, scoped_issues};
use crate::aggregate::{RankingReport, RankingSection, lifecycle_ranking};
use crate::config::Settings;
use crate::error::Result;
use crate::format::{OutputContext, TextTable, format_days};
use crate::repository::Repository;
use std::fmt::Write as _;

/// Execute the ranking command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded, the year is invalid,
/// or no event carries a date.
pub fn execute(settings: &Settings, repo: &Repository, ctx: &OutputContext) -> Result<()> {
    let issues = scoped_issues(repo, settings)?;
    if issues.is_empty() {
        return print_no_data(ctx, "no issues in scope");
    }
    let as_of = repo.get_migration_date()?;

    let report = lifecycle_ranking(issues, as_of, settings.ranking_limit);
    emit(ctx, &report, render_text)
}

fn render_text(report: &RankingReport, ctx: &OutputContext) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Lifecycle bottlenecks (as of {})",
        report.as_of.format("%Y-%m-%d")
    );
    render_section(&mut out, "Slowest to close", "days to close", &report.closed, ctx);
    render_section(&mut out, "Oldest still open", "days open", &report.open, ctx);
    out
}

fn render_section(
    out: &mut String,
    title: &str,
    metric: &str,
    section: &RankingSection,
    ctx: &OutputContext,
) {
    let _ = writeln!(out, "\n{title}:");
    let Some(overall) = &section.overall else {
        let _ = writeln!(out, "  (no measurable issues)");
        return;
    };
    let _ = writeln!(
        out,
        "  overall: {} issues, mean {} {metric}, median {}",
        overall.count,
        format_days(overall.mean),
        format_days(overall.median)
    );
    if section.labels.is_empty() {
        return;
    }

    let mut table = TextTable::new(["label", "count", "mean", "median"])
        .with_max_first_column(label_width(ctx, 32));
    for entry in &section.labels {
        table.push_row([
            entry.label.clone(),
            entry.summary.count.to_string(),
            format_days(entry.summary.mean),
            format_days(entry.summary.median),
        ]);
    }
    out.push_str(&table.render());
    if section.labels_considered > section.labels.len() {
        let _ = writeln!(
            out,
            "  ({} of {} labels shown)",
            section.labels.len(),
            section.labels_considered
        );
    }
}
