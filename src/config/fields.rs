//! Commit field names and the ordered mappings keyed by them.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// A commit field addressable by name from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitField {
    Hash,
    Type,
    Scope,
    Subject,
    Header,
    Author,
    Date,
}

const FIELDS: [CommitField; 7] = [
    CommitField::Hash,
    CommitField::Type,
    CommitField::Scope,
    CommitField::Subject,
    CommitField::Header,
    CommitField::Author,
    CommitField::Date,
];

const NAMES: [&str; 7] = ["Hash", "Type", "Scope", "Subject", "Header", "Author", "Date"];

impl CommitField {
    /// All accepted field names, in declaration order.
    pub fn names() -> &'static [&'static str] {
        &NAMES
    }

    /// Look a field up by name, ignoring ASCII case.
    pub fn lookup(name: &str) -> Option<Self> {
        FIELDS
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(name.trim()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hash => "Hash",
            Self::Type => "Type",
            Self::Scope => "Scope",
            Self::Subject => "Subject",
            Self::Header => "Header",
            Self::Author => "Author",
            Self::Date => "Date",
        }
    }

    /// Whether a header pattern capture group may be mapped onto this field.
    pub fn is_header_capture(&self) -> bool {
        matches!(self, Self::Type | Self::Scope | Self::Subject)
    }
}

impl FromStr for CommitField {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| ConfigError::UnknownField(s.to_string()))
    }
}

impl fmt::Display for CommitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compare two keys under the configured case sensitivity.
pub(crate) fn keys_equal(a: &str, b: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        a.to_lowercase() == b.to_lowercase()
    } else {
        a == b
    }
}

/// Ordered `field -> accepted values` filters. An empty set accepts everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFilters {
    entries: Vec<(CommitField, Vec<String>)>,
}

impl FieldFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add accepted values for a field. Values for a field already present
    /// are appended to its existing entry.
    pub fn with(
        mut self,
        field: CommitField,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some((_, existing)) => existing.extend(values),
            None => self.entries.push((field, values)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CommitField, &[String])> {
        self.entries.iter().map(|(f, v)| (*f, v.as_slice()))
    }
}

/// Ordered `raw key -> display title` mapping.
///
/// Keys without an entry resolve to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleMap {
    entries: Vec<(String, String)>,
}

impl TitleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mapping. A later entry for an existing key is ignored.
    pub fn with(mut self, key: impl Into<String>, title: impl Into<String>) -> Self {
        let key = key.into();
        if !self.entries.iter().any(|(k, _)| *k == key) {
            self.entries.push((key, title.into()));
        }
        self
    }

    /// Title for `key`, falling back to the raw key when unmapped.
    pub fn resolve<'a>(&'a self, key: &'a str, case_insensitive: bool) -> &'a str {
        self.get(key, case_insensitive).unwrap_or(key)
    }

    /// Title for `key` only when explicitly mapped.
    pub fn get(&self, key: &str, case_insensitive: bool) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| keys_equal(k, key, case_insensitive))
            .map(|(_, title)| title.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
