//! The assembled version tree handed to templates.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::commit::{Commit, Note};

/// A tag referenced from another tag, for compare links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedTag {
    pub name: String,
    pub date: DateTime<Utc>,
}

/// A release tag and the release tag preceding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    pub date: DateTime<Utc>,
    pub previous: Option<RelatedTag>,
}

impl Tag {
    pub fn related(&self) -> RelatedTag {
        RelatedTag {
            name: self.name.clone(),
            date: self.date,
        }
    }
}

/// Commits sharing a group key, under a display title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitGroup {
    pub key: String,
    pub title: String,
    pub commits: Vec<Commit>,
}

/// Notes sharing a keyword across one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteGroup {
    pub keyword: String,
    pub title: String,
    pub notes: Vec<Note>,
}

/// One release (or the Unreleased bucket when `tag` is `None`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Version {
    pub tag: Option<Tag>,
    /// The release this version follows.
    pub previous: Option<RelatedTag>,
    pub commits: Vec<Commit>,
    pub commit_groups: Vec<CommitGroup>,
    pub revert_commits: Vec<Commit>,
    pub merge_commits: Vec<Commit>,
    pub note_groups: Vec<NoteGroup>,
}

impl Version {
    pub fn is_unreleased(&self) -> bool {
        self.tag.is_none()
    }

    /// Tag name, or `Unreleased`.
    pub fn name(&self) -> &str {
        self.tag.as_ref().map_or("Unreleased", |t| t.name.as_str())
    }
}
