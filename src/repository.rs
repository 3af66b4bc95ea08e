//! Lazily loaded, memoized access to one issue snapshot.
//!
//! The snapshot is read on first use and every derived global fact
//! (migration date, label categories, year range) is computed at most once.
//! All cells are write-once, so a shared `&Repository` is safe to use from
//! several threads without duplicate loads.

use crate::error::{MetricsError, Result};
use crate::loader::{LoadReport, Snapshot, load_snapshot};
use crate::model::{DEFAULT_LABEL_SEPARATOR, Issue};
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct Repository {
    source: Option<PathBuf>,
    separator: String,
    snapshot: OnceCell<Snapshot>,
    migration_date: OnceCell<DateTime<Utc>>,
    label_categories: OnceCell<BTreeSet<String>>,
    year_range: OnceCell<Vec<String>>,
}

impl Repository {
    /// Repository backed by the snapshot file at `path`. Nothing is read yet.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>, separator: impl Into<String>) -> Self {
        Self {
            source: Some(path.into()),
            separator: separator.into(),
            snapshot: OnceCell::new(),
            migration_date: OnceCell::new(),
            label_categories: OnceCell::new(),
            year_range: OnceCell::new(),
        }
    }

    /// Repository over issues already in memory.
    #[must_use]
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        let report = LoadReport::in_memory(issues.len());
        Self {
            source: None,
            separator: DEFAULT_LABEL_SEPARATOR.to_string(),
            snapshot: OnceCell::with_value(Snapshot { issues, report }),
            migration_date: OnceCell::new(),
            label_categories: OnceCell::new(),
            year_range: OnceCell::new(),
        }
    }

    /// Path the snapshot is read from, if file-backed.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn snapshot(&self) -> Result<&Snapshot> {
        self.snapshot.get_or_try_init(|| {
            let Some(path) = self.source.as_deref() else {
                return Err(MetricsError::load("<memory>", "no snapshot source"));
            };
            let snapshot = load_snapshot(path, &self.separator)?;
            info!(
                path = %path.display(),
                issues = snapshot.report.issues_loaded,
                skipped = snapshot.report.skipped.len(),
                format = ?snapshot.report.format,
                "Loaded issue snapshot"
            );
            if snapshot.report.has_skips() {
                warn!(
                    skipped = snapshot.report.skipped.len(),
                    "Some records were malformed and left out; `summary` lists them"
                );
            }
            Ok(snapshot)
        })
    }

    /// All issues, loading the snapshot on first call.
    ///
    /// Later calls return the same slice without touching the file again.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Load`] if the snapshot cannot be read or parsed.
    pub fn get_issues(&self) -> Result<&[Issue]> {
        self.snapshot().map(|snapshot| snapshot.issues.as_slice())
    }

    /// Diagnostics from the load.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Load`] if the snapshot cannot be read or parsed.
    pub fn load_report(&self) -> Result<&LoadReport> {
        self.snapshot().map(|snapshot| &snapshot.report)
    }

    /// Latest event timestamp across all issues.
    ///
    /// Serves as "now" for open-issue ages.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::EmptyDataset`] if no event carries a date, or
    /// a load error.
    pub fn get_migration_date(&self) -> Result<DateTime<Utc>> {
        self.migration_date
            .get_or_try_init(|| {
                let date = self
                    .get_issues()?
                    .iter()
                    .filter_map(Issue::latest_event_date)
                    .max()
                    .ok_or(MetricsError::EmptyDataset {
                        fact: "the migration date",
                    })?;
                debug!(%date, "Derived migration date");
                Ok(date)
            })
            .copied()
    }

    /// Distinct non-empty label categories.
    ///
    /// # Errors
    ///
    /// Returns a load error.
    pub fn get_label_categories(&self) -> Result<&BTreeSet<String>> {
        self.label_categories.get_or_try_init(|| {
            let categories: BTreeSet<String> = self
                .get_issues()?
                .iter()
                .flat_map(|issue| issue.labels.iter())
                .filter_map(|label| label.category.clone())
                .collect();
            debug!(count = categories.len(), "Derived label categories");
            Ok(categories)
        })
    }

    /// Every year from the earliest to the latest creation year, as
    /// four-digit strings.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::EmptyDataset`] if there are no issues, or a
    /// load error.
    pub fn get_year_range(&self) -> Result<&[String]> {
        self.year_range
            .get_or_try_init(|| {
                let issues = self.get_issues()?;
                let first = issues.iter().map(Issue::created_year).min();
                let last = issues.iter().map(Issue::created_year).max();
                let (Some(first), Some(last)) = (first, last) else {
                    return Err(MetricsError::EmptyDataset {
                        fact: "the year range",
                    });
                };
                Ok((first..=last).map(|year| format!("{year:04}")).collect())
            })
            .map(Vec::as_slice)
    }

    /// Check that `category` exists in the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::MissingParameter`] for `None` and
    /// [`MetricsError::InvalidParameter`] for an unknown category, both
    /// listing the valid categories.
    pub fn require_category(&self, category: Option<&str>) -> Result<String> {
        let categories = self.get_label_categories()?;
        let valid = || categories.iter().cloned().collect::<Vec<_>>();
        match category {
            None => Err(MetricsError::MissingParameter {
                name: "category",
                valid: valid(),
            }),
            Some(name) if categories.contains(name) => Ok(name.to_string()),
            Some(name) => Err(MetricsError::InvalidParameter {
                name: "category",
                value: name.to_string(),
                valid: valid(),
            }),
        }
    }

    /// Check that `year` lies in the snapshot's year range.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::InvalidParameter`] listing the valid years.
    pub fn validate_year(&self, year: &str) -> Result<i32> {
        let range = self.get_year_range()?;
        let trimmed = year.trim();
        match trimmed.parse::<i32>() {
            Ok(parsed) if range.iter().any(|y| y == &format!("{parsed:04}")) => Ok(parsed),
            _ => Err(MetricsError::InvalidParameter {
                name: "year",
                value: year.to_string(),
                valid: range.to_vec(),
            }),
        }
    }

    /// Issues created in `year`, or all issues for `None`.
    ///
    /// # Errors
    ///
    /// Returns a load error or an invalid-year error.
    pub fn issues_in_year(&self, year: Option<&str>) -> Result<Vec<&Issue>> {
        let issues = self.get_issues()?;
        let Some(year) = year else {
            return Ok(issues.iter().collect());
        };
        let year = self.validate_year(year)?;
        Ok(issues
            .iter()
            .filter(|issue| issue.created_year() == year)
            .collect())
    }
}
