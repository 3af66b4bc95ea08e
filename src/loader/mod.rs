//! Snapshot loading for `issue_metrics`.
//!
//! This module handles:
//! - Reading the snapshot file (a JSON array, or JSON Lines)
//! - Normalizing raw issue shapes through the [`raw`] adapter
//! - Dropping malformed records while keeping the rest of the batch
//!
//! File-level failures (missing file, unreadable, not JSON) are fatal and
//! surface as [`MetricsError::Load`]. Record-level failures are collected in
//! the [`LoadReport`].

mod raw;

use crate::error::{MetricsError, Result};
use crate::model::Issue;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// On-disk layout of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    /// A single JSON array of issue objects.
    Array,
    /// One issue object per line.
    Jsonl,
}

/// A record dropped during load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

/// Diagnostics gathered while loading a snapshot.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct LoadReport {
    pub path: Option<PathBuf>,
    pub format: SnapshotFormat,
    pub records_seen: usize,
    pub issues_loaded: usize,
    pub skipped: Vec<SkippedRecord>,
    pub dropped_events: usize,
    pub undated_events: usize,
}

impl LoadReport {
    fn new(path: Option<PathBuf>, format: SnapshotFormat) -> Self {
        Self {
            path,
            format,
            records_seen: 0,
            issues_loaded: 0,
            skipped: Vec::new(),
            dropped_events: 0,
            undated_events: 0,
        }
    }

    /// Report for issues that were built in memory rather than loaded.
    #[must_use]
    pub fn in_memory(issue_count: usize) -> Self {
        Self {
            records_seen: issue_count,
            issues_loaded: issue_count,
            ..Self::new(None, SnapshotFormat::Array)
        }
    }

    /// True if any record or event was dropped.
    #[must_use]
    pub fn has_skips(&self) -> bool {
        !self.skipped.is_empty() || self.dropped_events > 0
    }
}

/// Issues plus the diagnostics of the load that produced them.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub issues: Vec<Issue>,
    pub report: LoadReport,
}

/// Read and normalize the snapshot at `path`.
///
/// # Errors
///
/// Returns [`MetricsError::Load`] if the file is missing, unreadable, empty,
/// or not valid JSON / JSON Lines.
pub fn load_snapshot(path: &Path, separator: &str) -> Result<Snapshot> {
    let contents =
        fs::read_to_string(path).map_err(|e| MetricsError::load(path, e.to_string()))?;
    let (records, format) =
        parse_records(&contents).map_err(|reason| MetricsError::load(path, reason))?;

    debug!(path = %path.display(), ?format, records = records.len(), "Parsed snapshot records");

    Ok(adapt_records(records, format, Some(path.to_path_buf()), separator))
}

/// Normalize snapshot text that is already in memory.
///
/// # Errors
///
/// Returns [`MetricsError::Load`] if the text is empty or not valid JSON /
/// JSON Lines.
pub fn parse_snapshot(contents: &str, separator: &str) -> Result<Snapshot> {
    let (records, format) =
        parse_records(contents).map_err(|reason| MetricsError::load("<memory>", reason))?;
    Ok(adapt_records(records, format, None, separator))
}

fn parse_records(contents: &str) -> std::result::Result<(Vec<Value>, SnapshotFormat), String> {
    let trimmed = contents.trim_start();
    if trimmed.is_empty() {
        return Err("file is empty".to_string());
    }

    if trimmed.starts_with('[') {
        let records: Vec<Value> =
            serde_json::from_str(trimmed).map_err(|e| format!("invalid JSON array: {e}"))?;
        return Ok((records, SnapshotFormat::Array));
    }

    let mut records = Vec::new();
    for (line_num, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .map_err(|e| format!("invalid JSON at line {}: {}", line_num + 1, e))?;
        records.push(value);
    }
    Ok((records, SnapshotFormat::Jsonl))
}

fn adapt_records(
    records: Vec<Value>,
    format: SnapshotFormat,
    path: Option<PathBuf>,
    separator: &str,
) -> Snapshot {
    let mut report = LoadReport::new(path, format);
    report.records_seen = records.len();
    let mut issues = Vec::with_capacity(records.len());

    for (index, value) in records.into_iter().enumerate() {
        match raw::adapt_issue(index, value, separator) {
            Ok(adapted) => {
                report.dropped_events += adapted.dropped_events;
                report.undated_events += adapted.undated_events;
                issues.push(adapted.issue);
            }
            Err(MetricsError::MalformedRecord { index, reason }) => {
                warn!(index, reason = %reason, "Skipping malformed issue record");
                report.skipped.push(SkippedRecord { index, reason });
            }
            Err(other) => {
                warn!(index, error = %other, "Skipping issue record");
                report.skipped.push(SkippedRecord {
                    index,
                    reason: other.to_string(),
                });
            }
        }
    }

    report.issues_loaded = issues.len();
    Snapshot { issues, report }
}
