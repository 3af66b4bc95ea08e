//! Issue labels and their `category<sep>sublabel` split.

use schemars::JsonSchema;
use serde::Serialize;

/// Separator used when none is configured.
pub const DEFAULT_LABEL_SEPARATOR: &str = ":";

/// A label attached to one issue.
///
/// `category` and `sublabel` are fixed at construction by splitting `name` on
/// the first occurrence of the separator. Empty halves are stored as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Label {
    pub name: String,
    pub category: Option<String>,
    pub sublabel: Option<String>,
    #[serde(skip)]
    separator: String,
}

impl Label {
    /// Build a label, splitting on [`DEFAULT_LABEL_SEPARATOR`].
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_separator(name, DEFAULT_LABEL_SEPARATOR)
    }

    /// Build a label, splitting on `separator`.
    #[must_use]
    pub fn with_separator(name: impl Into<String>, separator: &str) -> Self {
        let name = name.into();
        let (category, sublabel) = if separator.is_empty() {
            (None, None)
        } else {
            match name.split_once(separator) {
                Some((category, sublabel)) => (non_empty(category), non_empty(sublabel)),
                None => (None, None),
            }
        };

        Self {
            name,
            category,
            sublabel,
            separator: separator.to_string(),
        }
    }

    /// Reconstruct the label text from its parts.
    ///
    /// Falls back to `name` when the label was not split into two non-empty
    /// halves.
    #[must_use]
    pub fn full_label(&self) -> String {
        match (&self.category, &self.sublabel) {
            (Some(category), Some(sublabel)) => {
                format!("{category}{}{sublabel}", self.separator)
            }
            _ => self.name.clone(),
        }
    }

    /// True when this label's category equals `category`.
    #[must_use]
    pub fn in_category(&self, category: &str) -> bool {
        self.category.as_deref() == Some(category)
    }
}

fn non_empty(part: &str) -> Option<String> {
    if part.trim().is_empty() {
        None
    } else {
        Some(part.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_separator() {
        let label = Label::new("area:networking:tcp");
        assert_eq!(label.category.as_deref(), Some("area"));
        assert_eq!(label.sublabel.as_deref(), Some("networking:tcp"));
    }

    #[test]
    fn full_label_round_trips() {
        let label = Label::with_separator("area:networking", ":");
        assert_eq!(label.full_label(), "area:networking");

        let slash = Label::with_separator("kind/bug", "/");
        assert_eq!(slash.category.as_deref(), Some("kind"));
        assert_eq!(slash.full_label(), "kind/bug");
    }

    #[test]
    fn no_separator_means_no_category() {
        let label = Label::new("good first issue");
        assert!(label.category.is_none());
        assert!(label.sublabel.is_none());
        assert_eq!(label.full_label(), "good first issue");
    }

    #[test]
    fn empty_halves_are_absent() {
        let leading = Label::new(":orphan");
        assert!(leading.category.is_none());
        assert_eq!(leading.sublabel.as_deref(), Some("orphan"));
        assert_eq!(leading.full_label(), ":orphan");

        let trailing = Label::new("area:");
        assert_eq!(trailing.category.as_deref(), Some("area"));
        assert!(trailing.sublabel.is_none());
        assert_eq!(trailing.full_label(), "area:");
    }

    #[test]
    fn in_category_matches_exactly() {
        let label = Label::new("kind:bug");
        assert!(label.in_category("kind"));
        assert!(!label.in_category("Kind"));
        assert!(!label.in_category("area"));
    }
}
