//! Census command implementation.

use super::{emit, label_width, print_no_data, scoped_issues};
use crate::aggregate::{CensusReport, open_census};
use crate::cli::CensusArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::format::{OutputContext, TextTable};
use crate::repository::Repository;
use crate::util::month_key;
use std::fmt::Write as _;

/// Execute the census command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded, a parameter is
/// invalid, or no event carries a date.
pub fn execute(
    args: &CensusArgs,
    settings: &Settings,
    repo: &Repository,
    ctx: &OutputContext,
) -> Result<()> {
    let dimension = args.dimension.resolve(repo, settings.category.as_deref())?;
    let issues = scoped_issues(repo, settings)?;
    if issues.is_empty() {
        return print_no_data(ctx, "no issues in scope");
    }
    let as_of = repo.get_migration_date()?;

    let report = open_census(issues, as_of, &dimension, settings.census_cutoff);
    emit(ctx, &report, render_text)
}

/// Text output samples the grid: the last day of every month plus the final
/// day. JSON output carries the full daily series.
fn render_text(report: &CensusReport, ctx: &OutputContext) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Open issues by {} (cutoff {})",
        report.dimension.describe(),
        report.cutoff
    );
    let (Some(first), Some(last)) = (report.days.first(), report.days.last()) else {
        let _ = writeln!(out, "  (no labeled issues)");
        return out;
    };
    let _ = writeln!(
        out,
        "  {} issues, {} to {}",
        report.issues_counted,
        first.format("%Y-%m-%d"),
        last.format("%Y-%m-%d")
    );

    let sample: Vec<usize> = (0..report.days.len())
        .filter(|&i| {
            i + 1 == report.days.len()
                || month_key(&report.days[i]) != month_key(&report.days[i + 1])
        })
        .collect();

    let header_width = (label_width(ctx, 12) / report.series.len().max(1)).clamp(6, 20);
    let mut headers = vec!["day".to_string()];
    headers.extend(
        report
            .series
            .iter()
            .map(|series| crate::format::truncate_label(&series.bucket, header_width)),
    );

    let mut table = TextTable::new(headers);
    for index in sample {
        let mut row = vec![report.days[index].format("%Y-%m-%d").to_string()];
        row.extend(report.series.iter().map(|series| series.counts[index].to_string()));
        table.push_row(row);
    }
    let _ = writeln!(out);
    out.push_str(&table.render());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucketing::{CutoffFraction, Dimension};
    use crate::format::OutputMode;
    use crate::model::{Issue, IssueState};
    use chrono::{TimeZone, Utc};

    #[test]
    fn text_samples_month_ends() {
        let issue = Issue::new(IssueState::Open, Utc.with_ymd_and_hms(2023, 1, 20, 0, 0, 0).unwrap())
            .with_labels(["kind:bug"]);
        let as_of = Utc.with_ymd_and_hms(2023, 3, 10, 0, 0, 0).unwrap();
        let report = open_census(
            [&issue],
            as_of,
            &Dimension::Category("kind".into()),
            CutoffFraction::CENSUS,
        );
        let ctx = OutputContext::new(OutputMode::Plain, 80, false);
        let text = render_text(&report, &ctx);
        assert!(text.contains("2023-01-31"));
        assert!(text.contains("2023-02-28"));
        assert!(text.contains("2023-03-10"));
        assert!(!text.contains("2023-02-01"));
    }
}
