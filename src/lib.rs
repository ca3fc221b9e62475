//! chglog - A changelog generation engine for conventional-commit histories.
//!
//! # Overview
//!
//! chglog reads a commit log, classifies each header against a configurable
//! pattern, filters and sorts the commits, splits them into versions at
//! release tags, groups them by type, and renders the result through a
//! template. An optional stage rewrites commit subjects with the Claude
//! Code CLI and falls back to the originals on any failure.
//!
//! ```no_run
//! use chglog::{Config, Generator, GitLogSource, RevisionQuery};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default().validate()?;
//! let source = GitLogSource::discover(".")?;
//! let query: RevisionQuery = "v1.0.0..".parse()?;
//! Generator::new(&config, &source)
//!     .generate_to_file(&query, "CHANGELOG.md")
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod changelog;
pub mod claude;
pub mod commit;
pub mod config;
pub mod enhance;
pub mod error;
pub mod generator;
pub mod git;
pub mod llm;
pub mod platform;

// Re-export commonly used types
pub use changelog::{CommitGroup, NoteGroup, Renderer, Tag, TemplateSelection, Version};
pub use claude::ClaudeClient;
pub use commit::{Commit, CommitBuilder, IssueRef, Note};
pub use config::{ChangelogConfig, CommitField, Config};
pub use enhance::{BatchEnhancer, EnhancerOptions};
pub use error::{
    AcquisitionError, ClaudeError, CompletionError, ConfigError, GenerateError, RenderError,
};
pub use generator::{Generator, Stage};
pub use git::{GitLogSource, LogSource, RawCommit, RawLog, RawTag, RevisionQuery, StaticLogSource};
pub use llm::{ChatMessage, Completion, CompletionClient};
pub use platform::{Platform, Processor};
