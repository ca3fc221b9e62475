//! Revision query parsing.

use std::fmt;
use std::str::FromStr;

use crate::error::AcquisitionError;

/// Which part of history a generation run covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RevisionQuery {
    /// Everything reachable from HEAD.
    #[default]
    All,
    /// `from..to`: reachable from `to` (default HEAD) but not from `from`
    /// (default: none hidden, i.e. back to the root).
    Range {
        from: Option<String>,
        to: Option<String>,
    },
    /// Only the version closed by this tag.
    Single(String),
}

impl RevisionQuery {
    /// The tag a single-version query selects, if any.
    pub fn single_tag(&self) -> Option<&str> {
        match self {
            Self::Single(tag) => Some(tag),
            _ => None,
        }
    }
}

impl FromStr for RevisionQuery {
    type Err = AcquisitionError;

    /// Accepts `""`, `<old>..<new>`, `<tag>..`, `..<tag>` and `<tag>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let query = s.trim();
        if query.is_empty() || query == ".." {
            return Ok(Self::All);
        }
        if query.contains("...") || query.chars().any(char::is_whitespace) {
            return Err(AcquisitionError::InvalidQuery(s.to_string()));
        }

        let Some((from, to)) = query.split_once("..") else {
            return Ok(Self::Single(query.to_string()));
        };
        if to.contains("..") {
            return Err(AcquisitionError::InvalidQuery(s.to_string()));
        }

        let part = |p: &str| (!p.is_empty()).then(|| p.to_string());
        Ok(Self::Range {
            from: part(from),
            to: part(to),
        })
    }
}

impl fmt::Display for RevisionQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => Ok(()),
            Self::Single(tag) => f.write_str(tag),
            Self::Range { from, to } => write!(
                f,
                "{}..{}",
                from.as_deref().unwrap_or_default(),
                to.as_deref().unwrap_or_default()
            ),
        }
    }
}
