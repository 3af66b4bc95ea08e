//! Output formatting for `issue_metrics`.
//!
//! Reports are either printed as plain-text tables or serialized as JSON.
//! Diagnostics never go to stdout, so JSON output stays clean.

mod context;
mod text;

pub use context::{OutputContext, OutputMode};
pub use text::{TextTable, format_days, terminal_width, truncate_label};
