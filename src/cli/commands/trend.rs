//! Trend command implementation.

use super::{emit, label_width, print_no_data, scoped_issues};
use crate::aggregate::{MonthlyTrend, monthly_trend};
use crate::bucketing::Dimension;
use crate::cli::TrendArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::format::{OutputContext, TextTable};
use crate::repository::Repository;
use std::fmt::Write as _;

/// Execute the trend command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded or a parameter is
/// invalid.
pub fn execute(
    args: &TrendArgs,
    settings: &Settings,
    repo: &Repository,
    ctx: &OutputContext,
) -> Result<()> {
    let dimension = args.dimension.resolve(repo, settings.category.as_deref())?;
    let issues = scoped_issues(repo, settings)?;
    if issues.is_empty() {
        return print_no_data(ctx, "no issues in scope");
    }

    let k = match dimension {
        Dimension::Label => settings.label_top_k,
        Dimension::Category(_) => settings.category_top_k,
    };
    let report = monthly_trend(issues, &dimension, k);
    emit(ctx, &report, render_text)
}

/// One row per month, one column per retained bucket.
fn render_text(report: &MonthlyTrend, ctx: &OutputContext) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Issues created per month by {} (top {})",
        report.dimension.describe(),
        report.top_k
    );
    if report.series.is_empty() {
        let _ = writeln!(out, "  (no labeled issues)");
        return out;
    }

    // Bucket names become column headers, so keep them short.
    let header_width = (label_width(ctx, 8) / report.series.len()).clamp(6, 20);
    let mut headers = vec!["month".to_string()];
    headers.extend(
        report
            .series
            .iter()
            .map(|series| crate::format::truncate_label(&series.bucket, header_width)),
    );

    let mut table = TextTable::new(headers);
    for (index, month) in report.months.iter().enumerate() {
        let mut row = vec![month.clone()];
        row.extend(report.series.iter().map(|series| series.counts[index].to_string()));
        table.push_row(row);
    }
    let mut totals = vec!["total".to_string()];
    totals.extend(report.series.iter().map(|series| series.total.to_string()));
    table.push_row(totals);

    let _ = writeln!(out);
    out.push_str(&table.render());
    if report.omitted_buckets > 0 {
        let _ = writeln!(out, "\n  {} smaller bucket(s) not shown", report.omitted_buckets);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::OutputMode;
    use crate::model::{Issue, IssueState};
    use chrono::{TimeZone, Utc};

    #[test]
    fn text_has_a_row_per_month() {
        let issues = [
            Issue::new(IssueState::Open, Utc.with_ymd_and_hms(2023, 3, 15, 0, 0, 0).unwrap())
                .with_labels(["bug", "ui"]),
            Issue::new(IssueState::Open, Utc.with_ymd_and_hms(2023, 5, 2, 0, 0, 0).unwrap())
                .with_labels(["bug"]),
        ];
        let report = monthly_trend(&issues, &Dimension::Label, 10);
        let ctx = OutputContext::new(OutputMode::Plain, 80, false);
        let text = render_text(&report, &ctx);
        assert!(text.contains("2023-03"));
        assert!(text.contains("2023-04"));
        assert!(text.contains("2023-05"));
        assert!(text.contains("total"));
    }
}
