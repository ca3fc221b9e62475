//! Log source backed by a git repository via git2-rs.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use git2::{Oid, Repository, Sort};
use tracing::{debug, warn};

use crate::error::AcquisitionError;

use super::query::RevisionQuery;
use super::source::{split_message, LogSource, RawCommit, RawLog, RawTag};

/// Reads commits and tags from the repository at a path.
///
/// The repository is opened once per fetch, so the source itself holds no
/// git2 handles and can be shared across threads.
#[derive(Debug, Clone)]
pub struct GitLogSource {
    path: PathBuf,
}

impl GitLogSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Discover the repository containing `path` (walking up parents).
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, AcquisitionError> {
        let repo = Repository::discover(path).map_err(AcquisitionError::OpenRepository)?;
        let root = repo
            .workdir()
            .unwrap_or_else(|| repo.path())
            .to_path_buf();
        Ok(Self { path: root })
    }
}

impl LogSource for GitLogSource {
    fn fetch(&self, query: &RevisionQuery) -> Result<RawLog, AcquisitionError> {
        let repo = Repository::open(&self.path).map_err(AcquisitionError::OpenRepository)?;

        let (push, hide) = match query {
            RevisionQuery::All => (resolve_reference(&repo, "HEAD")?, None),
            RevisionQuery::Single(tag) => (resolve_reference(&repo, tag)?, None),
            RevisionQuery::Range { from, to } => {
                let to = resolve_reference(&repo, to.as_deref().unwrap_or("HEAD"))?;
                let from = from
                    .as_deref()
                    .map(|f| resolve_reference(&repo, f))
                    .transpose()?;
                (to, from)
            }
        };

        let commits = walk_commits(&repo, push, hide)?;
        let tags = get_all_tags(&repo)?;
        debug!(
            commits = commits.len(),
            tags = tags.len(),
            query = %query,
            "Fetched git log"
        );

        Ok(RawLog { commits, tags })
    }
}

/// Resolve a reference (tag, branch, commit hash) to a commit OID.
fn resolve_reference(repo: &Repository, reference: &str) -> Result<Oid, AcquisitionError> {
    // Try as a direct OID first
    if let Ok(oid) = Oid::from_str(reference) {
        if repo.find_commit(oid).is_ok() {
            return Ok(oid);
        }
    }

    match repo.revparse_single(reference) {
        Ok(obj) => Ok(obj.peel_to_commit().map_err(AcquisitionError::ParseCommit)?.id()),
        Err(e) => Err(AcquisitionError::ReferenceNotFound(reference.to_string(), e)),
    }
}

/// Walk commits reachable from `push` and not from `hide`, newest first.
fn walk_commits(
    repo: &Repository,
    push: Oid,
    hide: Option<Oid>,
) -> Result<Vec<RawCommit>, AcquisitionError> {
    let mut revwalk = repo.revwalk().map_err(AcquisitionError::RevwalkError)?;
    revwalk
        .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
        .map_err(AcquisitionError::RevwalkError)?;
    revwalk.push(push).map_err(AcquisitionError::RevwalkError)?;
    if let Some(hide) = hide {
        revwalk.hide(hide).map_err(AcquisitionError::RevwalkError)?;
    }

    let mut commits = Vec::new();
    for oid in revwalk {
        let oid = oid.map_err(AcquisitionError::RevwalkError)?;
        let commit = repo.find_commit(oid).map_err(AcquisitionError::ParseCommit)?;
        commits.push(raw_commit(&commit)?);
    }
    Ok(commits)
}

fn raw_commit(commit: &git2::Commit) -> Result<RawCommit, AcquisitionError> {
    let hash = commit.id().to_string();
    let message = String::from_utf8_lossy(commit.message_bytes());
    let (subject, body) = split_message(&message);
    let author = commit.author();
    let timestamp = to_utc(&hash, commit.time().seconds())?;

    Ok(RawCommit {
        parents: commit.parent_ids().map(|p| p.to_string()).collect(),
        author_name: String::from_utf8_lossy(author.name_bytes()).into_owned(),
        author_email: String::from_utf8_lossy(author.email_bytes()).into_owned(),
        timestamp,
        subject,
        body,
        hash,
    })
}

fn to_utc(hash: &str, seconds: i64) -> Result<DateTime<Utc>, AcquisitionError> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| AcquisitionError::InvalidTimestamp {
            hash: hash.to_string(),
            seconds,
        })
}

/// Get all tags that point (directly or through annotated tag objects) at
/// a commit.
///
/// Annotated tags are dated by their tagger, lightweight tags by their commit.
pub fn get_all_tags(repo: &Repository) -> Result<Vec<RawTag>, AcquisitionError> {
    let mut tags = Vec::new();

    repo.tag_foreach(|oid, name_bytes| {
        let Ok(name_str) = std::str::from_utf8(name_bytes) else {
            warn!("Skipping tag with OID {} - name is not valid UTF-8", oid);
            return true;
        };
        let name = name_str.strip_prefix("refs/tags/").unwrap_or(name_str).to_string();

        let object = match repo.find_object(oid, None) {
            Ok(object) => object,
            Err(e) => {
                warn!(tag = %name, error = %e, "Could not read tag object, skipping");
                return true;
            }
        };
        let commit = match object.peel_to_commit() {
            Ok(commit) => commit,
            Err(e) => {
                debug!(tag = %name, error = %e, "Tag does not point at a commit, skipping");
                return true;
            }
        };

        let seconds = object
            .as_tag()
            .and_then(|t| t.tagger())
            .map(|sig| sig.when().seconds())
            .unwrap_or_else(|| commit.time().seconds());

        match to_utc(&name, seconds) {
            Ok(date) => tags.push(RawTag {
                name,
                target: commit.id().to_string(),
                date,
            }),
            Err(e) => warn!(tag = %name, error = %e, "Skipping tag with invalid date"),
        }
        true // Continue iteration
    })
    .map_err(AcquisitionError::TagEnumeration)?;

    Ok(tags)
}
