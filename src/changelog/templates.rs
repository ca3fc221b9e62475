//! Built-in template bodies.

/// Terse list: anchored version headings, one bullet per commit, then
/// reverts, merged pull requests, notes and compare links.
pub const STANDARD_TEMPLATE: &str = r#"{% for version in versions %}
{% if version.tag %}
<a name="{{ version.tag.name }}"></a>
{% if version.previous %}
## [{{ version.tag.name }}] - {{ version.tag.date | datetime("%Y-%m-%d") }}
{% else %}
## {{ version.tag.name }} - {{ version.tag.date | datetime("%Y-%m-%d") }}
{% endif %}
{% else %}
<a name="unreleased"></a>
## [Unreleased]
{% endif %}
{% for group in version.commit_groups %}

### {{ group.title }}

{% for commit in group.commits %}
- {% if commit.scope %}**{{ commit.scope }}:** {% endif %}{{ commit.subject | upper_first | autolink }}
{% endfor %}
{% endfor %}
{% if version.revert_commits %}

### Reverts

{% for commit in version.revert_commits %}
- {{ commit.revert.header }}
{% endfor %}
{% endif %}
{% if version.merge_commits %}

### Pull Requests

{% for commit in version.merge_commits %}
- {{ commit.header }}
{% endfor %}
{% endif %}
{% for group in version.note_groups %}

### {{ group.title }}

{% for note in group.notes %}
{{ note.body | autolink }}
{% endfor %}
{% endfor %}
{% if not loop.last %}

{% endif %}
{% endfor %}
{% set linked = versions | selectattr("previous") | list %}
{% if linked and compare_url(linked[0].previous.name, "HEAD") %}

{% for version in linked %}
[{{ version.tag.name if version.tag else "Unreleased" }}]: {{ compare_url(version.previous.name, version.tag.name if version.tag else "HEAD") }}
{% endfor %}
{% endif %}
"#;

/// Keep a Changelog: categorized sections and compare links.
pub const KEEP_A_CHANGELOG_TEMPLATE: &str = r#"# {{ info.title }}

All notable changes to this project will be documented in this file.

The format is based on [Keep a Changelog](https://keepachangelog.com/en/1.1.0/),
and this project adheres to [Semantic Versioning](https://semver.org/spec/v2.0.0.html).
{% for version in versions %}

{% if version.tag %}
## [{{ version.tag.name }}] - {{ version.tag.date | datetime("%Y-%m-%d") }}
{% else %}
## [Unreleased]
{% endif %}
{% for group in version.commit_groups %}

### {{ group.title }}

{% for commit in group.commits %}
- {{ commit.subject | upper_first | autolink }}
{% endfor %}
{% endfor %}
{% for group in version.note_groups %}

### {{ group.title }}

{% for note in group.notes %}
- {{ note.body | autolink }}
{% endfor %}
{% endfor %}
{% endfor %}
{% set linked = versions | selectattr("previous") | list %}
{% if linked and compare_url(linked[0].previous.name, "HEAD") %}

{% for version in linked %}
[{{ version.tag.name if version.tag else "Unreleased" }}]: {{ compare_url(version.previous.name, version.tag.name if version.tag else "HEAD") }}
{% endfor %}
{% endif %}
"#;

/// Which template body to render with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSelection {
    Standard,
    KeepAChangelog,
    /// A caller-supplied body, used verbatim.
    Custom(String),
}

impl TemplateSelection {
    /// Resolve a built-in style by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "keep-a-changelog" => Some(Self::KeepAChangelog),
            _ => None,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            Self::Standard => STANDARD_TEMPLATE,
            Self::KeepAChangelog => KEEP_A_CHANGELOG_TEMPLATE,
            Self::Custom(body) => body,
        }
    }
}
