//! Distribution command implementation.

use super::{emit, label_width, print_no_data, scoped_issues};
use crate::aggregate::{DistributionReport, distribution};
use crate::cli::DistributionArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::format::{OutputContext, TextTable, format_days};
use crate::repository::Repository;
use std::fmt::Write as _;

/// Execute the distribution command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded, a parameter is
/// invalid, or no event carries a date.
pub fn execute(
    args: &DistributionArgs,
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

    let report = distribution(issues, as_of, &dimension, settings.distribution_cutoff);
    emit(ctx, &report, render_text)
}

fn render_text(report: &DistributionReport, ctx: &OutputContext) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Lifecycle distribution by {} (as of {}, cutoff {})",
        report.dimension.describe(),
        report.as_of.format("%Y-%m-%d"),
        report.cutoff
    );

    for state in &report.states {
        let _ = writeln!(out, "\n{} issues, {} in days:", state.state, state.metric);
        match &state.overall {
            Some(overall) => {
                let _ = writeln!(
                    out,
                    "  overall: {} issues, mean {}, median {}",
                    overall.count,
                    format_days(overall.mean),
                    format_days(overall.median)
                );
            }
            None => {
                let _ = writeln!(out, "  (no measurable issues)");
                continue;
            }
        }
        if state.buckets.is_empty() {
            let _ = writeln!(out, "  (no labeled issues)");
            continue;
        }

        let mut table = TextTable::new(["bucket", "count", "mean", "median"])
            .with_max_first_column(label_width(ctx, 32));
        for bucket in &state.buckets {
            table.push_row([
                bucket.bucket.clone(),
                bucket.summary.count.to_string(),
                format_days(bucket.summary.mean),
                format_days(bucket.summary.median),
            ]);
        }
        out.push_str(&table.render());
    }
    out
}
