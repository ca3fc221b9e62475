//! Changelog configuration: raw serde form and validated form.

pub mod fields;
pub mod options;

pub(crate) use fields::keys_equal;
pub use fields::{CommitField, FieldFilters, TitleMap};
pub use options::{
    ChangelogConfig, Config, FilterEntry, GroupSortBy, Info, TitleEntry, VersionSort,
    DEFAULT_MERGE_PATTERN, DEFAULT_REVERT_PATTERN,
};
