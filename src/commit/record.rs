//! The immutable classified commit and its builder.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{ChangelogConfig, CommitField};
use crate::git::RawCommit;

use super::notes::{Contact, IssueRef, Note, RefAction};

const SHORT_HASH_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// Pull request details parsed from a merge header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeInfo {
    #[serde(rename = "ref")]
    pub reference: String,
    pub source: String,
}

/// The header a revert commit reverts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevertInfo {
    pub header: String,
}

/// A classified commit. Fields are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    hash: String,
    short_hash: String,
    parents: Vec<String>,
    author: Author,
    timestamp: DateTime<Utc>,
    header: String,
    body: String,
    #[serde(rename = "type")]
    commit_type: String,
    scope: String,
    subject: String,
    breaking: bool,
    notes: Vec<Note>,
    refs: Vec<IssueRef>,
    ref_actions: Vec<RefAction>,
    mentions: Vec<String>,
    signers: Vec<Contact>,
    co_authors: Vec<Contact>,
    is_revert: bool,
    is_merge: bool,
    revert: Option<RevertInfo>,
    merge: Option<MergeInfo>,
    /// Index in the fetched log, 0 = newest.
    #[serde(skip)]
    position: usize,
}

impl Commit {
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn short_hash(&self) -> &str {
        &self.short_hash
    }

    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The raw first line of the message.
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn commit_type(&self) -> &str {
        &self.commit_type
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn is_breaking(&self) -> bool {
        self.breaking
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn refs(&self) -> &[IssueRef] {
        &self.refs
    }

    /// References preceded by an action word such as `Closes`.
    pub fn ref_actions(&self) -> &[RefAction] {
        &self.ref_actions
    }

    /// Mentioned user names, without the `@`.
    pub fn mentions(&self) -> &[String] {
        &self.mentions
    }

    pub fn signers(&self) -> &[Contact] {
        &self.signers
    }

    pub fn co_authors(&self) -> &[Contact] {
        &self.co_authors
    }

    pub fn is_revert(&self) -> bool {
        self.is_revert
    }

    pub fn is_merge(&self) -> bool {
        self.is_merge
    }

    pub fn revert(&self) -> Option<&RevertInfo> {
        self.revert.as_ref()
    }

    pub fn merge(&self) -> Option<&MergeInfo> {
        self.merge.as_ref()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// The value of a configurable field as text.
    pub fn field(&self, field: CommitField) -> Cow<'_, str> {
        match field {
            CommitField::Hash => Cow::Borrowed(&self.hash),
            CommitField::Type => Cow::Borrowed(&self.commit_type),
            CommitField::Scope => Cow::Borrowed(&self.scope),
            CommitField::Subject => Cow::Borrowed(&self.subject),
            CommitField::Header => Cow::Borrowed(&self.header),
            CommitField::Author => Cow::Borrowed(&self.author.name),
            CommitField::Date => Cow::Owned(self.timestamp.to_rfc3339()),
        }
    }

    /// A copy of this commit carrying a different subject.
    pub fn with_subject(&self, subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..self.clone()
        }
    }
}

/// Builds [`Commit`]s from raw log records under one configuration.
pub struct CommitBuilder<'a> {
    config: &'a ChangelogConfig,
}

impl<'a> CommitBuilder<'a> {
    pub fn new(config: &'a ChangelogConfig) -> Self {
        Self { config }
    }

    /// Classify one raw commit found at `position` in the log.
    pub fn build(&self, raw: &RawCommit, position: usize) -> Commit {
        let header = raw.subject.lines().next().unwrap_or_default().to_string();
        let fields = self.config.header.classify(&header);

        let revert = self.config.revert_pattern.captures(&header).map(|caps| RevertInfo {
            header: caps
                .get(1)
                .map(|m| m.as_str())
                .unwrap_or(header.as_str())
                .to_string(),
        });

        let merge = self.config.merge_pattern.captures(&header).map(|caps| MergeInfo {
            reference: caps.get(1).map(|m| m.as_str()).unwrap_or_default().to_string(),
            source: caps.get(2).map(|m| m.as_str()).unwrap_or_default().to_string(),
        });

        let scanner = &self.config.notes;
        let texts = [header.as_str(), raw.body.as_str()];
        let notes = scanner.extract_notes(&raw.body);
        let refs = scanner.extract_refs(&texts);
        let ref_actions = scanner.extract_ref_actions(&texts);
        let mentions = scanner.extract_mentions(&texts);
        let signers = scanner.extract_signers(&raw.body);
        let co_authors = scanner.extract_co_authors(&raw.body);

        Commit {
            short_hash: raw.hash.chars().take(SHORT_HASH_LEN).collect(),
            hash: raw.hash.clone(),
            parents: raw.parents.clone(),
            author: Author {
                name: raw.author_name.clone(),
                email: raw.author_email.clone(),
            },
            timestamp: raw.timestamp,
            body: raw.body.clone(),
            commit_type: fields.commit_type,
            scope: fields.scope,
            subject: fields.subject,
            breaking: fields.breaking
                || notes
                    .iter()
                    .any(|n| n.keyword.to_uppercase().contains("BREAKING")),
            is_revert: revert.is_some(),
            is_merge: raw.parents.len() > 1 || merge.is_some(),
            notes,
            refs,
            ref_actions,
            mentions,
            signers,
            co_authors,
            revert,
            merge,
            position,
            header,
        }
    }

    /// Classify a whole log, keeping log order.
    pub fn build_all(&self, raws: &[RawCommit]) -> Vec<Commit> {
        raws.iter()
            .enumerate()
            .map(|(position, raw)| self.build(raw, position))
            .collect()
    }
}
