//! The generation pipeline.
//!
//! `Idle → LogAcquired → Classified → Segmented → Grouped → [Enhanced] →
//! Rendered → Done`, strictly in that order. Only the log fetch and the
//! optional enhancement touch the outside world.

use std::fmt;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::changelog::{build_version, filter_commits, segment, sort_commits, Renderer, Version};
use crate::commit::CommitBuilder;
use crate::config::ChangelogConfig;
use crate::enhance::BatchEnhancer;
use crate::error::{AcquisitionError, GenerateError};
use crate::git::{LogSource, RevisionQuery};

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Idle,
    LogAcquired,
    Classified,
    Segmented,
    Grouped,
    Enhanced,
    Rendered,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LogAcquired => "log-acquired",
            Self::Classified => "classified",
            Self::Segmented => "segmented",
            Self::Grouped => "grouped",
            Self::Enhanced => "enhanced",
            Self::Rendered => "rendered",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured changelog generator.
///
/// Holds only shared references; every run builds its own version tree, so
/// one generator can serve concurrent runs.
pub struct Generator<'a> {
    config: &'a ChangelogConfig,
    source: &'a dyn LogSource,
    enhancer: Option<&'a BatchEnhancer>,
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a ChangelogConfig, source: &'a dyn LogSource) -> Self {
        Self {
            config,
            source,
            enhancer: None,
        }
    }

    /// Rewrite grouped commit subjects through `enhancer` before rendering.
    pub fn with_enhancer(mut self, enhancer: &'a BatchEnhancer) -> Self {
        self.enhancer = Some(enhancer);
        self
    }

    /// Build the version tree without rendering it.
    pub async fn plan(&self, query: &RevisionQuery) -> Result<Vec<Version>, GenerateError> {
        let config = self.config;

        let log = self.source.fetch(query)?;
        if log.commits.is_empty() {
            return Err(AcquisitionError::Empty {
                query: query.to_string(),
            }
            .into());
        }
        debug!(
            stage = ?Stage::LogAcquired,
            commits = log.commits.len(),
            tags = log.tags.len(),
            "Fetched log"
        );

        let commits = CommitBuilder::new(config).build_all(&log.commits);
        debug!(stage = ?Stage::Classified, count = commits.len(), "Classified commits");

        let mut commits = filter_commits(commits, &config.filters, config.case_insensitive);
        sort_commits(&mut commits, config.sort_by);
        let hashes: Vec<String> = log.commits.iter().map(|c| c.hash.clone()).collect();
        let segments = segment(commits, &hashes, &log.tags, config);
        debug!(stage = ?Stage::Segmented, versions = segments.len(), "Segmented versions");

        let mut versions: Vec<Version> = segments
            .into_iter()
            .map(|s| build_version(s, config))
            .collect();
        if let Some(tag) = query.single_tag() {
            versions.retain(|v| v.tag.as_ref().is_some_and(|t| t.name == tag));
            if versions.is_empty() {
                return Err(AcquisitionError::Empty {
                    query: query.to_string(),
                }
                .into());
            }
        }
        debug!(stage = ?Stage::Grouped, versions = versions.len(), "Grouped commits");

        if let Some(enhancer) = self.enhancer {
            enhance_versions(&mut versions, enhancer).await;
            debug!(stage = ?Stage::Enhanced, "Enhanced subjects");
        }

        Ok(versions)
    }

    /// Render a version tree with the configured template.
    pub fn render(&self, versions: &[Version]) -> Result<String, GenerateError> {
        let text = Renderer::for_config(self.config).render(
            self.config.template.body(),
            &self.config.info,
            versions,
        )?;
        debug!(stage = ?Stage::Rendered, bytes = text.len(), "Rendered changelog");
        Ok(text)
    }

    /// Generate and write the changelog to `sink`.
    ///
    /// Nothing is written unless rendering completed.
    pub async fn generate<W: Write>(
        &self,
        query: &RevisionQuery,
        sink: &mut W,
    ) -> Result<(), GenerateError> {
        let versions = self.plan(query).await?;
        let text = self.render(&versions)?;
        sink.write_all(text.as_bytes())?;
        sink.flush()?;
        debug!(stage = ?Stage::Done, "Changelog written");
        Ok(())
    }

    /// Generate the changelog into `path`, replacing it atomically.
    ///
    /// On any failure the existing file is left untouched.
    pub async fn generate_to_file(
        &self,
        query: &RevisionQuery,
        path: impl AsRef<Path>,
    ) -> Result<(), GenerateError> {
        let path = path.as_ref();
        let versions = self.plan(query).await?;
        let text = self.render(&versions)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(text.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| e.error)?;
        debug!(stage = ?Stage::Done, path = %path.display(), "Changelog written");
        Ok(())
    }
}

/// Replace every grouped commit by one copy per rewritten subject.
/// `Version.commits` keeps the originals.
async fn enhance_versions(versions: &mut [Version], enhancer: &BatchEnhancer) {
    let subjects: Vec<String> = versions
        .iter()
        .flat_map(|v| &v.commit_groups)
        .flat_map(|g| &g.commits)
        .map(|c| c.subject().to_string())
        .collect();
    if subjects.is_empty() {
        return;
    }

    let rewritten = enhancer.enhance(&subjects).await;
    for group in versions.iter_mut().flat_map(|v| v.commit_groups.iter_mut()) {
        group.commits = group
            .commits
            .iter()
            .flat_map(|commit| match rewritten.get(commit.subject()) {
                Some(lines) => lines.iter().map(|l| commit.with_subject(l.as_str())).collect(),
                None => vec![commit.clone()],
            })
            .collect();
    }
}
