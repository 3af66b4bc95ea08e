//! Output context and mode selection.
//!
//! # Mode Selection Logic
//!
//! 1. `--json` flag → JSON mode (machine-readable)
//! 2. `--quiet` flag → Quiet mode (nothing on stdout)
//! 3. Otherwise → Plain text tables

use serde::Serialize;
use std::io::IsTerminal;

use super::text::terminal_width;

/// Output mode determining formatting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Plain text tables.
    #[default]
    Plain,

    /// Pretty-printed JSON for machine consumption.
    Json,

    /// No report output; errors still go to stderr.
    Quiet,
}

impl OutputMode {
    /// Returns true if this mode produces structured data (JSON).
    #[must_use]
    pub const fn is_structured(&self) -> bool {
        matches!(self, Self::Json)
    }

    /// Returns true if this mode should suppress output.
    #[must_use]
    pub const fn is_quiet(&self) -> bool {
        matches!(self, Self::Quiet)
    }
}

/// Where and how command results are written.
#[derive(Debug, Clone)]
pub struct OutputContext {
    mode: OutputMode,
    width: usize,
    is_tty: bool,
}

impl Default for OutputContext {
    fn default() -> Self {
        Self::from_flags(false, false)
    }
}

impl OutputContext {
    #[must_use]
    pub const fn new(mode: OutputMode, width: usize, is_tty: bool) -> Self {
        Self {
            mode,
            width,
            is_tty,
        }
    }

    /// Create context from CLI flags; `json` wins over `quiet`.
    #[must_use]
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        let mode = if json {
            OutputMode::Json
        } else if quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Plain
        };

        Self {
            mode,
            width: terminal_width(),
            is_tty: std::io::stdout().is_terminal(),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> OutputMode {
        self.mode
    }

    #[must_use]
    pub const fn is_json(&self) -> bool {
        self.mode.is_structured()
    }

    #[must_use]
    pub const fn is_quiet(&self) -> bool {
        self.mode.is_quiet()
    }

    /// Terminal width in columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn is_tty(&self) -> bool {
        self.is_tty
    }

    #[must_use]
    pub const fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Serialize `value` as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized.
    pub fn to_json_pretty<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<String> {
        serde_json::to_string_pretty(value)
    }

    /// Print `value` as pretty JSON on stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized.
    pub fn json_pretty<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<()> {
        println!("{}", self.to_json_pretty(value)?);
        Ok(())
    }
}
