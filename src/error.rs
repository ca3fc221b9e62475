//! Error types for chglog modules using thiserror.

use std::time::Duration;

use thiserror::Error;

use crate::generator::Stage;

/// Errors from the version-control log source. Always fatal.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to find reference '{0}': {1}")]
    ReferenceNotFound(String, #[source] git2::Error),

    #[error("Failed to parse commit: {0}")]
    ParseCommit(#[source] git2::Error),

    #[error("Failed to walk commit history: {0}")]
    RevwalkError(#[source] git2::Error),

    #[error("Failed to enumerate tags: {0}")]
    TagEnumeration(#[source] git2::Error),

    #[error("Commit {hash} has invalid timestamp (seconds={seconds})")]
    InvalidTimestamp { hash: String, seconds: i64 },

    #[error("Invalid revision query '{0}'")]
    InvalidQuery(String),

    #[error("No commits found for query '{query}'")]
    Empty { query: String },
}

/// Errors raised while validating a [`crate::config::Config`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {name} pattern '{pattern}': {source}")]
    InvalidPattern {
        name: &'static str,
        pattern: String,
        #[source]
        source: regex_lite::Error,
    },

    #[error(
        "Unknown commit field '{0}' (expected one of: {fields})",
        fields = crate::config::CommitField::names().join(", ")
    )]
    UnknownField(String),

    #[error("Field '{0}' cannot be captured by the header pattern")]
    UnsupportedHeaderField(String),

    #[error("Field '{0}' appears more than once in the header field map")]
    DuplicateHeaderField(String),

    #[error("Header pattern has {groups} capture group(s) but {fields} field(s) are mapped")]
    HeaderFieldMismatch { groups: usize, fields: usize },

    #[error("Unknown platform '{0}' (expected github, gitlab, bitbucket or none)")]
    UnknownPlatform(String),

    #[error("Unknown version sort '{0}' (expected semver or date)")]
    UnknownVersionSort(String),

    #[error("Unknown group sort '{0}' (expected title, key or none)")]
    UnknownGroupSort(String),

    #[error("Unknown template '{0}' (expected standard or keep-a-changelog)")]
    UnknownTemplate(String),

    #[error("Enhancer chunk size must be at least 1")]
    EmptyChunk,
}

/// Errors from template rendering. Always fatal.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template failed to compile: {0}")]
    Syntax(#[source] minijinja::Error),

    #[error("Template failed to render: {0}")]
    Render(#[source] minijinja::Error),
}

/// Errors from Claude CLI operations.
#[derive(Error, Debug)]
pub enum ClaudeError {
    #[error("Claude Code CLI not found. Install with: npm install -g @anthropic-ai/claude-code")]
    NotInstalled,

    #[error("Claude Code CLI failed to execute: {0}")]
    ExecutionFailed(String),

    #[error("Failed to spawn Claude process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Claude returned invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Claude process timed out after {0} seconds")]
    Timeout(u64),

    #[error("Claude CLI exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },
}

/// Errors from a text-completion capability.
///
/// These never leave the enhancer: every variant is absorbed and the
/// affected subjects fall back to their original text.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error(transparent)]
    Claude(#[from] ClaudeError),

    #[error("Completion request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Completion provider returned an empty response")]
    EmptyResponse,

    #[error("Completion provider failed: {0}")]
    Provider(String),
}

/// Fatal error from a generation run, tagged with the stage that failed.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("{stage} stage failed: {0}", stage = Stage::LogAcquired)]
    Acquisition(#[from] AcquisitionError),

    #[error("{stage} stage failed: {0}", stage = Stage::Rendered)]
    Render(#[from] RenderError),

    #[error("{stage} stage failed: could not write changelog: {0}", stage = Stage::Done)]
    Write(#[from] std::io::Error),
}

impl GenerateError {
    /// The pipeline stage that was being entered when the run aborted.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Acquisition(_) => Stage::LogAcquired,
            Self::Render(_) => Stage::Rendered,
            Self::Write(_) => Stage::Done,
        }
    }
}
