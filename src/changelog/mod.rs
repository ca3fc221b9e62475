//! Version assembly and rendering.

pub mod filter;
pub mod format;
pub mod group;
pub mod model;
pub mod render;
pub mod segment;
pub mod templates;

pub use filter::{filter_commits, sort_commits};
pub use format::ChangelogCategory;
pub use group::build_version;
pub use model::{CommitGroup, NoteGroup, RelatedTag, Tag, Version};
pub use render::Renderer;
pub use segment::{order_tags, segment, version_from_tag, Segment};
pub use templates::{TemplateSelection, KEEP_A_CHANGELOG_TEMPLATE, STANDARD_TEMPLATE};
