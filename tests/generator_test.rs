//! End-to-end tests for the generation pipeline over in-memory logs.

mod common;

use chglog::{Config, GenerateError, Generator, RenderError, RevisionQuery, Stage};
use common::{init_tracing, static_log, temp_test_dir};

const HISTORY: &[&str] = &[
    "feat(api): add token refresh",
    "fix: null pointer in parser",
    "chore: bump deps",
    "feat: initial import",
];
const TAGS: &[(&str, usize)] = &[("v1.1.0", 0), ("v1.0.0", 3)];

fn feat_fix_config() -> Config {
    Config {
        repository_url: Some("https://github.com/acme/widgets".into()),
        filters: vec![chglog::config::FilterEntry {
            field: "Type".into(),
            values: vec!["feat".into(), "fix".into()],
        }],
        ..Config::default()
    }
}

async fn render(config: Config) -> Result<String, GenerateError> {
    let config = config.validate().unwrap();
    let src = static_log(HISTORY, TAGS);
    let mut out = Vec::new();
    Generator::new(&config, &src)
        .generate(&RevisionQuery::All, &mut out)
        .await?;
    Ok(String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn test_filtered_groups() {
    init_tracing();
    let config = feat_fix_config().validate().unwrap();
    let src = static_log(
        &["feat: add search", "fix: crash on empty query", "chore: lint"],
        &[],
    );

    let versions = Generator::new(&config, &src).plan(&RevisionQuery::All).await.unwrap();
    assert_eq!(versions.len(), 1);
    assert!(versions[0].is_unreleased());

    let groups: Vec<(&str, usize)> = versions[0]
        .commit_groups
        .iter()
        .map(|g| (g.title.as_str(), g.commits.len()))
        .collect();
    assert_eq!(groups, vec![("Bug Fixes", 1), ("Features", 1)]);
    assert!(versions[0].commits.iter().all(|c| c.commit_type() != "chore"));
}

#[tokio::test]
async fn test_standard_template_output() {
    let text = render(feat_fix_config()).await.unwrap();
    let expected = r#"<a name="v1.1.0"></a>
## [v1.1.0] - 2023-11-14

### Bug Fixes

- Null pointer in parser

### Features

- **api:** Add token refresh

<a name="v1.0.0"></a>
## v1.0.0 - 2023-11-14

### Features

- Initial import

[v1.1.0]: https://github.com/acme/widgets/compare/v1.0.0...v1.1.0
"#;
    assert_eq!(text, expected);
}

#[tokio::test]
async fn test_keep_a_changelog_output() {
    let config = Config {
        repository_url: Some("https://github.com/acme/widgets".into()),
        ..Config::keep_a_changelog()
    };
    let text = render(config).await.unwrap();
    let expected = r#"# Changelog

All notable changes to this project will be documented in this file.

The format is based on [Keep a Changelog](https://keepachangelog.com/en/1.1.0/),
and this project adheres to [Semantic Versioning](https://semver.org/spec/v2.0.0.html).

## [v1.1.0] - 2023-11-14

### Added

- Add token refresh

### Fixed

- Null pointer in parser

## [v1.0.0] - 2023-11-14

### Added

- Initial import

[v1.1.0]: https://github.com/acme/widgets/compare/v1.0.0...v1.1.0
"#;
    assert_eq!(text, expected);
}

#[tokio::test]
async fn test_no_links_without_repository_url() {
    let config = Config {
        repository_url: None,
        ..feat_fix_config()
    };
    let text = render(config).await.unwrap();
    assert!(text.ends_with("- Initial import\n"), "got: {text}");
    assert!(!text.contains("compare"));
}

#[tokio::test]
async fn test_static_template_is_emitted_unchanged() {
    let body = "# Release notes\n\nNothing to see here.\n";
    let config = Config {
        template_body: Some(body.into()),
        ..Config::default()
    };
    assert_eq!(render(config).await.unwrap(), body);
}

#[tokio::test]
async fn test_custom_template_sees_version_tree() {
    let config = Config {
        template_body: Some(
            "{% for v in versions %}{{ v.tag.name }}:{{ v.commits | length }} {% endfor %}".into(),
        ),
        ..Config::default()
    };
    assert_eq!(render(config).await.unwrap(), "v1.1.0:3 v1.0.0:1 ");
}

#[tokio::test]
async fn test_unknown_placeholder_fails_at_render() {
    let config = Config {
        template_body: Some("# {{ info.title }}\n{{ release_notes }}\n".into()),
        ..Config::default()
    };
    let err = render(config).await.unwrap_err();
    assert_eq!(err.stage(), Stage::Rendered);
    assert!(matches!(err, GenerateError::Render(RenderError::Render(_))));
}

#[tokio::test]
async fn test_template_syntax_error_fails_at_render() {
    let config = Config {
        template_body: Some("{% for v in versions %}unclosed".into()),
        ..Config::default()
    };
    let err = render(config).await.unwrap_err();
    assert!(matches!(err, GenerateError::Render(RenderError::Syntax(_))));
}

#[tokio::test]
async fn test_generate_to_file_writes_changelog() {
    let dir = temp_test_dir();
    let path = dir.path().join("CHANGELOG.md");
    let config = feat_fix_config().validate().unwrap();
    let src = static_log(HISTORY, TAGS);

    Generator::new(&config, &src)
        .generate_to_file(&RevisionQuery::All, &path)
        .await
        .unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("<a name=\"v1.1.0\"></a>\n"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_render_failure_leaves_existing_file_intact() {
    let dir = temp_test_dir();
    let path = dir.path().join("CHANGELOG.md");
    std::fs::write(&path, "previous contents\n").unwrap();

    let config = Config {
        template_body: Some("{{ missing }}".into()),
        ..Config::default()
    }
    .validate()
    .unwrap();
    let src = static_log(HISTORY, TAGS);

    let err = Generator::new(&config, &src)
        .generate_to_file(&RevisionQuery::All, &path)
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Stage::Rendered);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous contents\n");
}

#[tokio::test]
async fn test_empty_range_fails_at_acquisition() {
    let config = Config::default().validate().unwrap();
    let src = static_log(HISTORY, TAGS);

    // HEAD is tagged v1.1.0, so nothing lies beyond it.
    let err = Generator::new(&config, &src)
        .plan(&"v1.1.0..".parse().unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Stage::LogAcquired);
    assert!(err.to_string().starts_with("log-acquired stage failed"));
}

#[tokio::test]
async fn test_concurrent_runs_share_one_generator() {
    let config = feat_fix_config().validate().unwrap();
    let src = static_log(HISTORY, TAGS);
    let generator = Generator::new(&config, &src);
    let single: RevisionQuery = "v1.0.0".parse().unwrap();

    let (a, b) = tokio::join!(generator.plan(&RevisionQuery::All), generator.plan(&single));
    assert_eq!(a.unwrap().len(), 2);
    let single = b.unwrap();
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].name(), "v1.0.0");
}

#[tokio::test]
async fn test_subjects_and_notes_are_autolinked() {
    let config = Config {
        repository_url: Some("https://gitlab.com/acme/widgets".into()),
        ..Config::default()
    }
    .validate()
    .unwrap();
    let src = static_log(
        &["fix: retry uploads (#12), reported by @ada\n\nBREAKING CHANGE: see !7"],
        &[],
    );

    let mut out = Vec::new();
    Generator::new(&config, &src)
        .generate(&RevisionQuery::All, &mut out)
        .await
        .unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(
        text.contains(
            "- Retry uploads ([#12](https://gitlab.com/acme/widgets/-/issues/12)), \
             reported by [@ada](https://gitlab.com/ada)\n"
        ),
        "got: {text}"
    );
    assert!(text.contains("see [!7](https://gitlab.com/acme/widgets/-/merge_requests/7)\n"));
}
