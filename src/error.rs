//! Error types for `issue_metrics`.
//!
//! Errors fall into three tiers:
//! - structural errors ([`MetricsError::Load`]) abort the run;
//! - [`MetricsError::EmptyDataset`] is fatal only for the fact being derived;
//! - [`MetricsError::MalformedRecord`] is absorbed by the loader, which drops
//!   the offending record and keeps going.

use schemars::JsonSchema;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = MetricsError> = std::result::Result<T, E>;

/// All errors produced by the metrics engine and its CLI.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to load issue snapshot {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    #[error("no data available to derive {fact}")]
    EmptyDataset { fact: &'static str },

    #[error("malformed record #{index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("invalid value '{value}' for {name}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        valid: Vec<String>,
    },

    #[error("{name} is required")]
    MissingParameter {
        name: &'static str,
        valid: Vec<String>,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl MetricsError {
    /// Build a load error for `path`.
    pub fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build a malformed-record error.
    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            index,
            reason: reason.into(),
        }
    }

    /// Machine-readable classification of this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Load { .. } | Self::Json(_) => ErrorCode::LoadFailed,
            Self::EmptyDataset { .. } => ErrorCode::EmptyDataset,
            Self::MalformedRecord { .. } => ErrorCode::MalformedRecord,
            Self::InvalidParameter { .. } | Self::MissingParameter { .. } => {
                ErrorCode::InvalidParameter
            }
            Self::Config(_) | Self::Yaml(_) => ErrorCode::Config,
        }
    }

    /// Remediation hint shown under the error message, when one applies.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Load { .. }
            | Self::MissingParameter {
                name: "data-path", ..
            } => Some(
                "set --data, ISSUE_METRICS_DATA_PATH, or data-path in issue-metrics.yaml"
                    .to_string(),
            ),
            Self::InvalidParameter { valid, .. } | Self::MissingParameter { valid, .. }
                if !valid.is_empty() =>
            {
                Some(format!("valid values are: {}", valid.join(", ")))
            }
            Self::EmptyDataset { .. } => {
                Some("the snapshot contains no usable issues or event timestamps".to_string())
            }
            _ => None,
        }
    }
}

/// Stable error classification, mapped to process exit codes by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    LoadFailed,
    EmptyDataset,
    MalformedRecord,
    InvalidParameter,
    Config,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoadFailed => "LOAD_FAILED",
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::MalformedRecord => "MALFORMED_RECORD",
            Self::InvalidParameter => "INVALID_PARAMETER",
            Self::Config => "CONFIG",
        }
    }

    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::LoadFailed => 3,
            Self::EmptyDataset => 4,
            Self::InvalidParameter => 2,
            Self::MalformedRecord | Self::Config => 1,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable error, printed instead of plain text in JSON mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct StructuredError {
    /// Stable code, e.g. `INVALID_PARAMETER`.
    pub code: String,
    pub message: String,
    pub hint: Option<String>,
    pub exit_code: u8,
}

impl StructuredError {
    #[must_use]
    pub fn from_error(err: &MetricsError) -> Self {
        let code = err.code();
        Self {
            code: code.as_str().to_string(),
            message: err.to_string(),
            hint: err.hint(),
            exit_code: code.exit_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_names_path() {
        let err = MetricsError::load("/tmp/missing.json", "No such file or directory");
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.json"));
        assert!(msg.contains("No such file"));
        assert_eq!(err.code(), ErrorCode::LoadFailed);
        assert!(err.hint().is_some());
    }

    #[test]
    fn invalid_parameter_hint_lists_valid_values() {
        let err = MetricsError::InvalidParameter {
            name: "category",
            value: "nope".to_string(),
            valid: vec!["area".to_string(), "kind".to_string()],
        };
        assert_eq!(err.to_string(), "invalid value 'nope' for category");
        assert_eq!(err.hint().as_deref(), Some("valid values are: area, kind"));
        assert_eq!(err.code().exit_code(), 2);
    }

    #[test]
    fn missing_parameter_without_choices_has_no_hint() {
        let err = MetricsError::MissingParameter {
            name: "category",
            valid: Vec::new(),
        };
        assert!(err.hint().is_none());
    }

    #[test]
    fn structured_error_carries_code_and_hint() {
        let err = MetricsError::EmptyDataset {
            fact: "the migration date",
        };
        let structured = StructuredError::from_error(&err);
        assert_eq!(structured.code, "EMPTY_DATASET");
        assert_eq!(structured.exit_code, 4);
        assert_eq!(structured.message, "no data available to derive the migration date");
        assert!(structured.hint.is_some());
    }
}
