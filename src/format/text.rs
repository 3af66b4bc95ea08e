//! Plain-text table helpers.

use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const DEFAULT_WIDTH: usize = 80;
const ELLIPSIS: &str = "...";

/// Terminal width: `COLUMNS` if set, else the size reported by the
/// terminal, else 80.
#[must_use]
pub fn terminal_width() -> usize {
    resolve_width(std::env::var("COLUMNS").ok().as_deref(), || {
        crossterm::terminal::size().ok().map(|(cols, _)| cols)
    })
}

fn resolve_width(columns: Option<&str>, detect: impl FnOnce() -> Option<u16>) -> usize {
    columns
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|width| *width > 0)
        .or_else(|| detect().map(usize::from).filter(|width| *width > 0))
        .unwrap_or(DEFAULT_WIDTH)
}

/// Truncate `text` to at most `max_width` display columns, ending in `...`.
#[must_use]
pub fn truncate_label(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width <= ELLIPSIS.len() {
        return ".".repeat(max_width);
    }

    let budget = max_width - ELLIPSIS.len();
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push_str(ELLIPSIS);
    out
}

/// Days with one decimal, e.g. `12.3`.
#[must_use]
pub fn format_days(days: f64) -> String {
    format!("{days:.1}")
}

/// A minimal left/right aligned text table.
#[derive(Debug, Clone, Default)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    max_first_column: Option<usize>,
}

impl TextTable {
    #[must_use]
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            max_first_column: None,
        }
    }

    /// Cap the first (label) column; longer labels are truncated.
    #[must_use]
    pub const fn with_max_first_column(mut self, width: usize) -> Self {
        self.max_first_column = Some(width);
        self
    }

    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render with two-space indent. The first column is left-aligned, the
    /// rest right-aligned.
    #[must_use]
    pub fn render(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.headers.iter().cloned());
        for row in &self.rows {
            builder.push_record(row.iter().enumerate().map(|(i, cell)| {
                match (i, self.max_first_column) {
                    (0, Some(max)) => truncate_label(cell, max),
                    _ => cell.clone(),
                }
            }));
        }

        let mut table = builder.build();
        table
            .with(Style::blank())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()));

        let mut out = String::new();
        for line in table.to_string().lines() {
            out.push(' ');
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_label_ascii() {
        assert_eq!(truncate_label("short", 12), "short");
        assert_eq!(truncate_label("exactly_twelve", 14), "exactly_twelve");
        assert_eq!(truncate_label("this_is_too_long_for_column", 12), "this_is_t...");
    }

    #[test]
    fn test_truncate_label_wide_chars() {
        let cjk = "网络".repeat(5);
        assert_eq!(truncate_label(&cjk, 5), "网...");
        assert_eq!(truncate_label("abc网def", 8), "abc网def");
        assert_eq!(truncate_label("abc网def", 6), "abc...");
        assert_eq!(truncate_label("abcdef", 2), "..");
    }

    #[test]
    fn test_table_alignment() {
        let mut table = TextTable::new(["bucket", "count"]);
        table.push_row(["bug", "12"]);
        table.push_row(["feature", "3"]);
        let rendered = table.render();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|line| line.starts_with("  ")));
        assert!(lines[0].trim_start().starts_with("bucket"));
        assert!(lines[1].trim_start().starts_with("bug "));
        assert!(lines[2].trim_start().starts_with("feature "));
        // Numeric columns are right-aligned: every row ends in the same column.
        assert!(lines[0].ends_with("count"));
        assert!(lines[1].ends_with("12"));
        assert!(lines[2].ends_with(" 3"));
        assert_eq!(lines[0].width(), lines[1].width());
        assert_eq!(lines[1].width(), lines[2].width());
    }

    #[test]
    fn test_width_prefers_columns_then_terminal() {
        assert_eq!(resolve_width(Some("132"), || Some(200)), 132);
        assert_eq!(resolve_width(None, || Some(200)), 200);
        assert_eq!(resolve_width(Some("junk"), || Some(150)), 150);
        assert_eq!(resolve_width(Some("0"), || None), DEFAULT_WIDTH);
        assert_eq!(resolve_width(None, || Some(0)), DEFAULT_WIDTH);
    }

    #[test]
    fn test_table_truncates_first_column() {
        let mut table = TextTable::new(["label", "n"]).with_max_first_column(8);
        table.push_row(["area:networking", "1"]);
        assert!(table.render().contains("area:..."));
    }

    #[test]
    fn test_format_days() {
        assert_eq!(format_days(1.26), "1.3");
        assert_eq!(format_days(10.0), "10.0");
    }
}
