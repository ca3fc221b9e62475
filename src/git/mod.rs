//! Log acquisition: raw commit records and their sources.

pub mod query;
pub mod repository;
pub mod source;

pub use query::RevisionQuery;
pub use repository::GitLogSource;
pub use source::{LogSource, RawCommit, RawLog, RawTag, StaticLogSource};
