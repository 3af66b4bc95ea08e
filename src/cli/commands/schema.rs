//! Schema command implementation.
//!
//! Emits JSON Schema documents for every report the CLI can print with
//! `--json`, so downstream charting code can validate its input.

use super::summary::SummaryReport;
use crate::aggregate::{ActivityReport, CensusReport, DistributionReport, MonthlyTrend, RankingReport};
use crate::cli::{SchemaArgs, SchemaTarget};
use crate::config::Settings;
use crate::error::{Result, StructuredError};
use crate::format::OutputContext;
use chrono::{DateTime, Utc};
use schemars::schema::RootSchema;
use schemars::schema_for;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize, schemars::JsonSchema)]
struct ErrorEnvelope {
    error: StructuredError,
}

#[derive(Debug, Serialize)]
struct SchemaOutput {
    tool: &'static str,
    version: &'static str,
    generated_at: DateTime<Utc>,
    schemas: BTreeMap<&'static str, RootSchema>,
}

/// Execute the schema command.
///
/// Output is JSON in every mode except quiet.
///
/// # Errors
///
/// Returns an error if a schema cannot be serialized.
pub fn execute(args: &SchemaArgs, ctx: &OutputContext) -> Result<()> {
    if ctx.is_quiet() {
        return Ok(());
    }

    let payload = SchemaOutput {
        tool: "issue-metrics",
        version: env!("CARGO_PKG_VERSION"),
        generated_at: Utc::now(),
        schemas: build_schemas(args.target),
    };
    ctx.json_pretty(&payload)?;
    Ok(())
}

fn build_schemas(target: SchemaTarget) -> BTreeMap<&'static str, RootSchema> {
    let mut schemas = BTreeMap::new();
    let all = target == SchemaTarget::All;

    if all || target == SchemaTarget::Summary {
        schemas.insert("SummaryReport", schema_for!(SummaryReport));
    }
    if all || target == SchemaTarget::Distribution {
        schemas.insert("DistributionReport", schema_for!(DistributionReport));
    }
    if all || target == SchemaTarget::Trend {
        schemas.insert("MonthlyTrend", schema_for!(MonthlyTrend));
    }
    if all || target == SchemaTarget::Census {
        schemas.insert("CensusReport", schema_for!(CensusReport));
    }
    if all || target == SchemaTarget::Ranking {
        schemas.insert("RankingReport", schema_for!(RankingReport));
    }
    if all || target == SchemaTarget::Activity {
        schemas.insert("ActivityReport", schema_for!(ActivityReport));
    }
    if all || target == SchemaTarget::Config {
        schemas.insert("Settings", schema_for!(Settings));
    }
    if all || target == SchemaTarget::Error {
        schemas.insert("ErrorEnvelope", schema_for!(ErrorEnvelope));
    }

    schemas
}
