//! Commit classification: header fields, notes, references and the
//! resulting immutable commit record.

pub mod header;
pub mod notes;
pub mod record;

pub use header::{HeaderFields, HeaderPattern, DEFAULT_HEADER_PATTERN};
pub use notes::{Contact, IssueRef, Note, NoteExtractor, RefAction, DEFAULT_REF_ACTIONS};
pub use record::{Author, Commit, CommitBuilder, MergeInfo, RevertInfo};
