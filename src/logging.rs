//! Tracing setup for the `issue-metrics` binary and tests.
//!
//! Diagnostics always go to stderr so report output on stdout stays
//! machine-readable. `RUST_LOG` overrides the verbosity flags.

use std::io::IsTerminal;
use std::path::Path;
use std::sync::{Mutex, Once};

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const CRATE_TARGET: &str = "issue_metrics";

/// Install the global subscriber.
///
/// `log_file`, when given, additionally receives every event as JSON lines.
///
/// # Errors
///
/// Returns an error if the filter is invalid, the log file cannot be created,
/// or a global subscriber is already installed.
pub fn init_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(verbosity, quiet)))?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity > 0)
        .with_level(true)
        .without_time()
        .with_ansi(std::io::stderr().is_terminal());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer);

    if let Some(path) = log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("cannot create log file {}", path.display()))?;
        let json_layer = fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .json();
        tracing::subscriber::set_global_default(subscriber.with(json_layer))?;
    } else {
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}

/// Filter directive used when `RUST_LOG` is unset.
///
/// The default level is `info`, which shows the load summary and the
/// analysis being run; each `-v` lowers it one step.
#[must_use]
pub fn default_filter(verbosity: u8, quiet: bool) -> String {
    if quiet {
        return "error".to_string();
    }
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!("{CRATE_TARGET}={level}")
}

/// Route tracing output through the test harness; safe to call repeatedly.
pub fn init_test_logging() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(format!("{CRATE_TARGET}=debug"))
            .with_test_writer()
            .try_init()
            .ok();
    });
}
