//! `issue_metrics` - lifecycle metrics over a static issue-tracker snapshot
//!
//! This crate derives time-to-close, open-age and label-category breakdowns
//! from an exported set of issues, their labels and their event timelines.
//!
//! # Architecture
//!
//! The crate is organized into the following modules, leaf to root:
//!
//! - [`model`] - Record types (Issue, Event, Label)
//! - [`loader`] - Snapshot parsing and raw-shape normalization
//! - [`repository`] - Memoized access to one snapshot and its global facts
//! - [`lifecycle`] - Effective closed dates and per-issue measurements
//! - [`bucketing`] - Bucket keys and long-tail collapsing
//! - [`aggregate`] - Distribution, trend, census, ranking and activity reports
//! - [`config`] - Layered configuration
//! - [`cli`] - Command-line interface using clap
//! - [`format`] - Output formatting (text, JSON)
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregate;
pub mod bucketing;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod lifecycle;
pub mod loader;
pub mod logging;
pub mod model;
pub mod repository;
pub mod util;

pub use error::{ErrorCode, MetricsError, Result, StructuredError};
pub use repository::Repository;

use cli::{Cli, Commands, commands};
use config::Settings;
use format::OutputContext;
use std::path::Path;
use tracing::debug;

/// Run one parsed command line.
///
/// Configuration is merged from `project_dir` (normally the working
/// directory), the environment and `cli`; the snapshot is only read by
/// commands that need it.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the snapshot cannot be
/// loaded, or the command's parameters fail validation.
pub fn run(cli: &Cli, project_dir: &Path, ctx: &OutputContext) -> Result<()> {
    if let Commands::Schema(args) = &cli.command {
        return commands::schema::execute(args, ctx);
    }

    let layer = config::load_config(project_dir, cli.config.as_deref(), &cli.overrides())?;
    let settings = Settings::from_layer(&layer)?;
    debug!(?settings, "Resolved settings");

    let repo = Repository::open(settings.require_data_path()?, settings.label_separator.clone());

    match &cli.command {
        Commands::Summary => commands::summary::execute(&settings, &repo, ctx),
        Commands::Distribution(args) => commands::distribution::execute(args, &settings, &repo, ctx),
        Commands::Trend(args) => commands::trend::execute(args, &settings, &repo, ctx),
        Commands::Census(args) => commands::census::execute(args, &settings, &repo, ctx),
        Commands::Ranking(_) => commands::ranking::execute(&settings, &repo, ctx),
        Commands::Activity(_) => commands::activity::execute(&settings, &repo, ctx),
        Commands::Schema(args) => commands::schema::execute(args, ctx),
    }
}
