//! Raw configuration and its validated, read-only form.

use regex_lite::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::changelog::format::ChangelogCategory;
use crate::changelog::templates::TemplateSelection;
use crate::commit::{HeaderPattern, NoteExtractor, DEFAULT_HEADER_PATTERN, DEFAULT_REF_ACTIONS};
use crate::error::ConfigError;
use crate::platform::Platform;

use super::fields::{CommitField, FieldFilters, TitleMap};

pub const DEFAULT_REVERT_PATTERN: &str = r#"^Revert "([\s\S]*)"$"#;
pub const DEFAULT_MERGE_PATTERN: &str = r"^Merge pull request #(\d+) from (.*)$";

/// How release versions are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionSort {
    /// Tag date, newest first.
    #[default]
    Date,
    /// Semantic version precedence, highest first. Tags that are not
    /// valid semver keep their date position.
    Semver,
}

/// How commit groups are ordered within a version.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GroupSortBy {
    /// By display title, then raw key.
    #[default]
    Title,
    /// By raw group key.
    RawKey,
    /// By position in an explicit list of keys or titles; unlisted groups go last.
    Custom(Vec<String>),
    /// First-seen order.
    None,
}

/// One `key -> title` pair of an ordered mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TitleEntry {
    pub key: String,
    pub title: String,
}

impl TitleEntry {
    pub fn new(key: &str, title: &str) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
        }
    }
}

/// One field filter: the commit's `field` must equal one of `values`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilterEntry {
    pub field: String,
    pub values: Vec<String>,
}

/// Unvalidated configuration, deserializable from any serde format.
///
/// Field names are plain strings here; [`Config::validate`] resolves them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub header_pattern: String,
    pub header_fields: Vec<String>,
    pub revert_pattern: String,
    pub merge_pattern: String,
    pub filters: Vec<FilterEntry>,
    /// Commit sort field; `None` keeps log order.
    pub sort_by: Option<String>,
    pub group_by: String,
    /// `title`, `key` or `none`. Ignored when `group_order` is non-empty.
    pub group_sort: String,
    pub group_order: Vec<String>,
    pub titles: Vec<TitleEntry>,
    pub note_keywords: Vec<String>,
    /// Words such as `Closes` that attach an action to an issue reference.
    pub ref_actions: Vec<String>,
    pub note_titles: Vec<TitleEntry>,
    /// Tags not matching this pattern are not releases. Empty matches all.
    pub tag_pattern: String,
    /// `date` or `semver`.
    pub version_sort: String,
    pub case_insensitive: bool,
    pub title: String,
    pub repository_url: Option<String>,
    /// `github`, `gitlab`, `bitbucket` or `none`. Detected from
    /// `repository_url` when absent.
    pub platform: Option<String>,
    pub issue_tracker_url: Option<String>,
    pub next_tag: Option<String>,
    /// Built-in template name.
    pub template: String,
    /// Custom template body; takes precedence over `template`.
    pub template_body: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            header_pattern: DEFAULT_HEADER_PATTERN.to_string(),
            header_fields: vec!["Type".into(), "Scope".into(), "Subject".into()],
            revert_pattern: DEFAULT_REVERT_PATTERN.to_string(),
            merge_pattern: DEFAULT_MERGE_PATTERN.to_string(),
            filters: Vec::new(),
            sort_by: Some("Scope".into()),
            group_by: "Type".into(),
            group_sort: "title".into(),
            group_order: Vec::new(),
            titles: vec![
                TitleEntry::new("feat", "Features"),
                TitleEntry::new("fix", "Bug Fixes"),
                TitleEntry::new("perf", "Performance Improvements"),
                TitleEntry::new("refactor", "Code Refactoring"),
            ],
            note_keywords: vec!["BREAKING CHANGE".into()],
            ref_actions: DEFAULT_REF_ACTIONS.iter().map(|a| a.to_string()).collect(),
            note_titles: Vec::new(),
            tag_pattern: String::new(),
            version_sort: "date".into(),
            case_insensitive: false,
            title: "CHANGELOG".into(),
            repository_url: None,
            platform: None,
            issue_tracker_url: None,
            next_tag: None,
            template: "standard".into(),
            template_body: None,
        }
    }
}

impl Config {
    /// Preset mapping conventional types onto Keep a Changelog categories.
    pub fn keep_a_changelog() -> Self {
        let mapping = ChangelogCategory::type_mapping();
        let titles = mapping
            .iter()
            .map(|(key, category)| TitleEntry::new(key, category.as_str()))
            .collect();

        Self {
            filters: vec![FilterEntry {
                field: "Type".into(),
                values: mapping.iter().map(|(key, _)| key.to_string()).collect(),
            }],
            group_order: ChangelogCategory::all()
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            titles,
            title: "Changelog".into(),
            version_sort: "semver".into(),
            template: "keep-a-changelog".into(),
            ..Self::default()
        }
    }

    /// Resolve field names, compile patterns and pick the platform.
    pub fn validate(&self) -> Result<ChangelogConfig, ConfigError> {
        let ci = self.case_insensitive;

        let header_fields = self
            .header_fields
            .iter()
            .map(|name| name.parse::<CommitField>())
            .collect::<Result<Vec<_>, _>>()?;
        let header = HeaderPattern::compile(&self.header_pattern, &header_fields, ci)?;

        let mut filters = FieldFilters::new();
        for entry in &self.filters {
            filters = filters.with(entry.field.parse()?, entry.values.iter().cloned());
        }

        let sort_by = self
            .sort_by
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::parse::<CommitField>)
            .transpose()?;
        let group_by = self.group_by.parse::<CommitField>()?;

        let group_sort = if !self.group_order.is_empty() {
            GroupSortBy::Custom(self.group_order.clone())
        } else {
            match self.group_sort.to_lowercase().as_str() {
                "" | "title" => GroupSortBy::Title,
                "key" => GroupSortBy::RawKey,
                "none" => GroupSortBy::None,
                other => return Err(ConfigError::UnknownGroupSort(other.to_string())),
            }
        };

        let version_sort = match self.version_sort.to_lowercase().as_str() {
            "" | "date" => VersionSort::Date,
            "semver" => VersionSort::Semver,
            other => return Err(ConfigError::UnknownVersionSort(other.to_string())),
        };

        let tag_filter = if self.tag_pattern.is_empty() {
            None
        } else {
            Some(compile("tag", &self.tag_pattern, ci)?)
        };

        let platform = match self.platform.as_deref() {
            Some(id) => Platform::from_id(id)
                .ok_or_else(|| ConfigError::UnknownPlatform(id.to_string()))?,
            None => self
                .repository_url
                .as_deref()
                .map(Platform::detect)
                .unwrap_or(Platform::None),
        };

        let template = match &self.template_body {
            Some(body) => TemplateSelection::Custom(body.clone()),
            None => TemplateSelection::from_name(&self.template)
                .ok_or_else(|| ConfigError::UnknownTemplate(self.template.clone()))?,
        };

        Ok(ChangelogConfig {
            header,
            revert_pattern: compile("revert", &self.revert_pattern, ci)?,
            merge_pattern: compile("merge", &self.merge_pattern, ci)?,
            notes: NoteExtractor::new(&self.note_keywords, ci)?
                .with_ref_actions(&self.ref_actions)?,
            filters,
            sort_by,
            group_by,
            group_sort,
            titles: to_title_map(&self.titles),
            note_titles: to_title_map(&self.note_titles),
            tag_filter,
            version_sort,
            case_insensitive: ci,
            info: Info {
                title: self.title.clone(),
                repository_url: self
                    .repository_url
                    .as_ref()
                    .map(|url| url.trim_end_matches('/').to_string()),
            },
            platform,
            issue_tracker_url: self
                .issue_tracker_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
            next_tag: self.next_tag.clone().filter(|t| !t.is_empty()),
            template,
        })
    }
}

fn compile(
    name: &'static str,
    pattern: &str,
    case_insensitive: bool,
) -> Result<Regex, ConfigError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source| ConfigError::InvalidPattern {
            name,
            pattern: pattern.to_string(),
            source,
        })
}

fn to_title_map(entries: &[TitleEntry]) -> TitleMap {
    entries
        .iter()
        .fold(TitleMap::new(), |map, e| map.with(e.key.clone(), e.title.clone()))
}

/// Document-level metadata available to templates.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Info {
    pub title: String,
    pub repository_url: Option<String>,
}

/// Validated configuration. Read-only for the whole generation run.
#[derive(Debug, Clone)]
pub struct ChangelogConfig {
    pub header: HeaderPattern,
    pub revert_pattern: Regex,
    pub merge_pattern: Regex,
    pub notes: NoteExtractor,
    pub filters: FieldFilters,
    pub sort_by: Option<CommitField>,
    pub group_by: CommitField,
    pub group_sort: GroupSortBy,
    pub titles: TitleMap,
    pub note_titles: TitleMap,
    pub tag_filter: Option<Regex>,
    pub version_sort: VersionSort,
    pub case_insensitive: bool,
    pub info: Info,
    pub platform: Platform,
    pub issue_tracker_url: Option<String>,
    pub next_tag: Option<String>,
    pub template: TemplateSelection,
}

impl ChangelogConfig {
    /// Whether `tag` names a release under the tag filter pattern.
    pub fn is_release_tag(&self, tag: &str) -> bool {
        self.tag_filter.as_ref().is_none_or(|re| re.is_match(tag))
    }
}
