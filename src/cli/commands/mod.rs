//! Subcommand implementations.
//!
//! Each command validates its parameters against the repository, runs one
//! aggregation and hands the report to the output context.

pub mod activity;
pub mod census;
pub mod distribution;
pub mod ranking;
pub mod schema;
pub mod summary;
pub mod trend;

use crate::config::Settings;
use crate::error::Result;
use crate::format::OutputContext;
use crate::model::Issue;
use crate::repository::Repository;
use serde::Serialize;
use tracing::debug;

/// Issues in scope for an analysis: all of them, or one creation year.
pub(crate) fn scoped_issues<'a>(repo: &'a Repository, settings: &Settings) -> Result<Vec<&'a Issue>> {
    let issues = repo.issues_in_year(settings.year.as_deref())?;
    debug!(year = ?settings.year, issues = issues.len(), "Selected issues");
    Ok(issues)
}

#[derive(Serialize)]
struct NoData<'a> {
    status: &'static str,
    reason: &'a str,
}

/// Report an empty selection without failing.
pub(crate) fn print_no_data(ctx: &OutputContext, reason: &str) -> Result<()> {
    if ctx.is_json() {
        ctx.json_pretty(&NoData {
            status: "no_data",
            reason,
        })?;
    } else if !ctx.is_quiet() {
        println!("No data: {reason}.");
    }
    Ok(())
}

/// Print `report` as JSON or through `render`, honoring quiet mode.
pub(crate) fn emit<T, F>(ctx: &OutputContext, report: &T, render: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&T, &OutputContext) -> String,
{
    if ctx.is_json() {
        ctx.json_pretty(report)?;
    } else if !ctx.is_quiet() {
        print!("{}", render(report, ctx));
    }
    Ok(())
}

/// Width left for the label column after `fixed` columns of numbers.
pub(crate) fn label_width(ctx: &OutputContext, fixed: usize) -> usize {
    ctx.width().saturating_sub(fixed).max(12)
}
