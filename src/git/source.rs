//! Raw log records and the log source abstraction.

use chrono::{DateTime, Utc};

use crate::error::AcquisitionError;

use super::query::RevisionQuery;

/// One commit as read from version control, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommit {
    pub hash: String,
    pub parents: Vec<String>,
    pub author_name: String,
    pub author_email: String,
    pub timestamp: DateTime<Utc>,
    /// First line of the message.
    pub subject: String,
    /// Message after the first line, leading blank lines removed.
    pub body: String,
}

impl RawCommit {
    /// Build a commit from a full message, splitting subject from body.
    pub fn from_message(
        hash: impl Into<String>,
        parents: Vec<String>,
        author_name: impl Into<String>,
        author_email: impl Into<String>,
        timestamp: DateTime<Utc>,
        message: &str,
    ) -> Self {
        let (subject, body) = split_message(message);
        Self {
            hash: hash.into(),
            parents,
            author_name: author_name.into(),
            author_email: author_email.into(),
            timestamp,
            subject,
            body,
        }
    }
}

/// Split a commit message into its first line and the remaining body.
pub fn split_message(message: &str) -> (String, String) {
    let message = message.trim_start_matches(['\n', '\r']);
    let (subject, rest) = message.split_once('\n').unwrap_or((message, ""));
    let body = rest.trim_start_matches(['\n', '\r']).trim_end();
    (subject.trim_end().to_string(), body.to_string())
}

/// A tag as read from version control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTag {
    pub name: String,
    /// Hash of the commit the tag points at.
    pub target: String,
    pub date: DateTime<Utc>,
}

/// Result of one log fetch: commits newest first, plus every known tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLog {
    pub commits: Vec<RawCommit>,
    pub tags: Vec<RawTag>,
}

/// Supplies raw commits for a revision query.
///
/// Implementations must return commits newest first. Tags may include ones
/// outside the requested range.
pub trait LogSource: Send + Sync {
    fn fetch(&self, query: &RevisionQuery) -> Result<RawLog, AcquisitionError>;
}

/// A log source serving a prebuilt, linear log.
#[derive(Debug, Clone, Default)]
pub struct StaticLogSource {
    log: RawLog,
}

impl StaticLogSource {
    pub fn new(log: RawLog) -> Self {
        Self { log }
    }

    /// Index of the commit a reference names: a tag, a full hash or a
    /// unique hash prefix.
    fn resolve(&self, reference: &str) -> Result<usize, AcquisitionError> {
        let hash = self
            .log
            .tags
            .iter()
            .find(|t| t.name == reference)
            .map(|t| t.target.as_str())
            .unwrap_or(reference);

        let mut matches = self
            .log
            .commits
            .iter()
            .enumerate()
            .filter(|(_, c)| !hash.is_empty() && c.hash.starts_with(hash));

        match (matches.next(), matches.next()) {
            (Some((idx, _)), None) => Ok(idx),
            _ => Err(AcquisitionError::ReferenceNotFound(
                reference.to_string(),
                git2::Error::from_str("Reference not found"),
            )),
        }
    }
}

impl LogSource for StaticLogSource {
    fn fetch(&self, query: &RevisionQuery) -> Result<RawLog, AcquisitionError> {
        let total = self.log.commits.len();
        let (start, end) = match query {
            RevisionQuery::All => (0, total),
            RevisionQuery::Single(tag) => (self.resolve(tag)?, total),
            RevisionQuery::Range { from, to } => {
                let start = match to {
                    Some(to) => self.resolve(to)?,
                    None => 0,
                };
                let end = match from {
                    Some(from) => self.resolve(from)?,
                    None => total,
                };
                (start, end.max(start))
            }
        };

        Ok(RawLog {
            commits: self.log.commits[start..end].to_vec(),
            tags: self.log.tags.clone(),
        })
    }
}
