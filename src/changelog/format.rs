//! Keep a Changelog categories and the conventional types feeding them.

use std::fmt;

/// Section headings of a Keep a Changelog document, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangelogCategory {
    Added,
    Changed,
    Deprecated,
    Removed,
    Fixed,
    Security,
}

const ALL: [ChangelogCategory; 6] = [
    ChangelogCategory::Added,
    ChangelogCategory::Changed,
    ChangelogCategory::Deprecated,
    ChangelogCategory::Removed,
    ChangelogCategory::Fixed,
    ChangelogCategory::Security,
];

/// Conventional commit types that land in a category, in preset order.
const TYPE_CATEGORIES: [(&str, ChangelogCategory); 7] = [
    ("feat", ChangelogCategory::Added),
    ("perf", ChangelogCategory::Changed),
    ("refactor", ChangelogCategory::Changed),
    ("deprecate", ChangelogCategory::Deprecated),
    ("remove", ChangelogCategory::Removed),
    ("fix", ChangelogCategory::Fixed),
    ("security", ChangelogCategory::Security),
];

impl ChangelogCategory {
    pub fn all() -> &'static [ChangelogCategory] {
        &ALL
    }

    /// Get the display name for the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Changed => "Changed",
            Self::Deprecated => "Deprecated",
            Self::Removed => "Removed",
            Self::Fixed => "Fixed",
            Self::Security => "Security",
        }
    }

    /// Every `(type, category)` pair, in preset order.
    pub fn type_mapping() -> &'static [(&'static str, ChangelogCategory)] {
        &TYPE_CATEGORIES
    }
}

impl fmt::Display for ChangelogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
