//! Command-line interface definitions.

pub mod commands;

use crate::bucketing::Dimension;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::repository::Repository;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Lifecycle and label metrics over a static issue-tracker snapshot.
#[derive(Parser, Debug)]
#[command(name = "issue-metrics", version, about)]
#[command(
    long_about = "Derive time-to-close, open-age and label breakdowns from an exported \
    issue snapshot (a JSON array or JSON Lines file of issues with labels and events)."
)]
pub struct Cli {
    /// Issue snapshot to analyze.
    #[arg(short = 'd', long = "data", global = true, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Config file to use instead of ./issue-metrics.yaml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Separator between a label's category and sublabel.
    #[arg(long, global = true, value_name = "SEP")]
    pub separator: Option<String>,

    /// Only analyze issues created in this year.
    #[arg(long, global = true)]
    pub year: Option<String>,

    /// Emit JSON instead of text tables.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress report output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Also write logs as JSON lines to this file.
    #[arg(long, global = true, env = "ISSUE_METRICS_LOG_FILE", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Snapshot overview: counts, migration date, categories, years.
    Summary,
    /// Open-age and time-to-close statistics per bucket.
    Distribution(DistributionArgs),
    /// Issues created per month for the busiest buckets.
    Trend(TrendArgs),
    /// Daily count of open issues per bucket.
    Census(CensusArgs),
    /// Labels with the slowest close times and oldest open issues.
    Ranking(RankingArgs),
    /// Event totals and top issue creators.
    Activity(ActivityArgs),
    /// Print JSON Schemas for the report types.
    Schema(SchemaArgs),
}

/// How to bucket issues.
#[derive(Args, Debug, Clone, Default)]
pub struct DimensionArgs {
    /// Bucket by the sublabels of this label category.
    #[arg(short, long)]
    pub category: Option<String>,

    /// Bucket by full label text instead of a category.
    #[arg(long, conflicts_with = "category")]
    pub by_label: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DistributionArgs {
    #[command(flatten)]
    pub dimension: DimensionArgs,

    /// Buckets at or below this share of observations fold into "other".
    #[arg(long)]
    pub cutoff: Option<f64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct TrendArgs {
    #[command(flatten)]
    pub dimension: DimensionArgs,

    /// Number of buckets to keep.
    #[arg(long)]
    pub top_k: Option<usize>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CensusArgs {
    #[command(flatten)]
    pub dimension: DimensionArgs,

    /// Buckets at or below this share of observations fold into "other".
    #[arg(long)]
    pub cutoff: Option<f64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RankingArgs {
    /// Labels listed per section.
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ActivityArgs {
    /// Only count events authored by this user.
    #[arg(short, long)]
    pub user: Option<String>,

    /// Creators listed.
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SchemaArgs {
    /// Which schema to print.
    #[arg(value_enum, default_value_t = SchemaTarget::All)]
    pub target: SchemaTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SchemaTarget {
    #[default]
    All,
    Summary,
    Distribution,
    Trend,
    Census,
    Ranking,
    Activity,
    Config,
    Error,
}

impl Cli {
    /// Command-line values as the highest-precedence config layer input.
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        let mut overrides = CliOverrides {
            data_path: self.data.clone(),
            label_separator: self.separator.clone(),
            year: self.year.clone(),
            ..CliOverrides::default()
        };

        match &self.command {
            Commands::Distribution(args) => {
                overrides.category.clone_from(&args.dimension.category);
                overrides.distribution_cutoff = args.cutoff;
            }
            Commands::Census(args) => {
                overrides.category.clone_from(&args.dimension.category);
                overrides.census_cutoff = args.cutoff;
            }
            Commands::Trend(args) => {
                overrides.category.clone_from(&args.dimension.category);
                if args.dimension.by_label {
                    overrides.label_top_k = args.top_k;
                } else {
                    overrides.category_top_k = args.top_k;
                }
            }
            Commands::Ranking(args) => overrides.ranking_limit = args.limit,
            Commands::Activity(args) => {
                overrides.user.clone_from(&args.user);
                overrides.creator_limit = args.limit;
            }
            Commands::Summary | Commands::Schema(_) => {}
        }

        overrides
    }
}

impl DimensionArgs {
    /// Resolve the dimension, validating a category against the snapshot.
    ///
    /// `configured` is the category from the merged configuration.
    ///
    /// # Errors
    ///
    /// Returns a missing/invalid parameter error listing the known categories.
    pub fn resolve(&self, repo: &Repository, configured: Option<&str>) -> Result<Dimension> {
        if self.by_label {
            return Ok(Dimension::Label);
        }
        repo.require_category(configured).map(Dimension::Category)
    }
}
