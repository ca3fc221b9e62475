//! Commit and note grouping within one version.

use std::cmp::Ordering;

use crate::commit::Commit;
use crate::config::{keys_equal, ChangelogConfig, GroupSortBy};

use super::model::{CommitGroup, NoteGroup, Version};
use super::segment::Segment;

/// Turn a segment into a fully grouped [`Version`].
///
/// Reverts and merges get their own lists instead of a commit group.
/// Commits whose group key is empty stay in `commits` but join no group.
pub fn build_version(segment: Segment, config: &ChangelogConfig) -> Version {
    let ci = config.case_insensitive;

    let mut revert_commits = Vec::new();
    let mut merge_commits = Vec::new();
    let mut buckets: Vec<Bucket> = Vec::new();

    for (index, commit) in segment.commits.iter().enumerate() {
        if commit.is_revert() {
            revert_commits.push(commit.clone());
            continue;
        }
        if commit.is_merge() {
            merge_commits.push(commit.clone());
            continue;
        }
        let key = commit.field(config.group_by);
        if key.is_empty() {
            continue;
        }
        match buckets.iter_mut().find(|b| keys_equal(&b.key, &key, ci)) {
            Some(bucket) => bucket.commits.push((index, commit.clone())),
            None => buckets.push(Bucket {
                title: config.titles.resolve(&key, ci).to_string(),
                key: key.into_owned(),
                commits: vec![(index, commit.clone())],
            }),
        }
    }

    sort_buckets(&mut buckets, &config.group_sort, ci);
    let commit_groups = merge_by_title(buckets);
    let note_groups = note_groups(&segment.commits, config);

    Version {
        tag: segment.tag,
        previous: segment.previous,
        commits: segment.commits,
        commit_groups,
        revert_commits,
        merge_commits,
        note_groups,
    }
}

struct Bucket {
    key: String,
    title: String,
    /// (index within the version, commit)
    commits: Vec<(usize, Commit)>,
}

fn sort_buckets(buckets: &mut [Bucket], sort: &GroupSortBy, ci: bool) {
    match sort {
        GroupSortBy::None => {}
        GroupSortBy::Title => {
            buckets.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.key.cmp(&b.key)))
        }
        GroupSortBy::RawKey => buckets.sort_by(|a, b| a.key.cmp(&b.key)),
        GroupSortBy::Custom(order) => {
            let rank = |bucket: &Bucket| {
                order
                    .iter()
                    .position(|o| {
                        keys_equal(o, &bucket.title, ci) || keys_equal(o, &bucket.key, ci)
                    })
                    .unwrap_or(usize::MAX)
            };
            buckets.sort_by(|a, b| match rank(a).cmp(&rank(b)) {
                Ordering::Equal => a.key.cmp(&b.key),
                other => other,
            });
        }
    }
}

/// Several keys may share a title (`perf` and `refactor` both "Changed");
/// they become one group at the first one's position.
fn merge_by_title(buckets: Vec<Bucket>) -> Vec<CommitGroup> {
    let mut merged: Vec<Bucket> = Vec::new();
    for bucket in buckets {
        match merged.iter_mut().find(|m| m.title == bucket.title) {
            Some(existing) => {
                existing.commits.extend(bucket.commits);
                existing.commits.sort_by_key(|(index, _)| *index);
            }
            None => merged.push(bucket),
        }
    }
    merged
        .into_iter()
        .map(|b| CommitGroup {
            key: b.key,
            title: b.title,
            commits: b.commits.into_iter().map(|(_, c)| c).collect(),
        })
        .collect()
}

fn note_groups(commits: &[Commit], config: &ChangelogConfig) -> Vec<NoteGroup> {
    let mut groups: Vec<NoteGroup> = Vec::new();
    for note in commits.iter().flat_map(Commit::notes) {
        match groups.iter_mut().find(|g| g.keyword == note.keyword) {
            Some(group) => group.notes.push(note.clone()),
            None => groups.push(NoteGroup {
                keyword: note.keyword.clone(),
                title: config
                    .note_titles
                    .resolve(&note.keyword, config.case_insensitive)
                    .to_string(),
                notes: vec![note.clone()],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::commit::CommitBuilder;
    use crate::config::{Config, TitleEntry};
    use crate::git::RawCommit;

    fn segment(config: &ChangelogConfig, messages: &[&str]) -> Segment {
        let builder = CommitBuilder::new(config);
        let commits = messages
            .iter()
            .enumerate()
            .map(|(i, message)| {
                let raw = RawCommit::from_message(
                    format!("{:040x}", i),
                    vec!["p".to_string()],
                    "Test User",
                    "test@example.com",
                    Utc.timestamp_opt(1_700_000_000 - i as i64, 0).unwrap(),
                    *message,
                );
                builder.build(&raw, i)
            })
            .collect();
        Segment {
            tag: None,
            previous: None,
            commits,
        }
    }

    fn titles(version: &Version) -> Vec<&str> {
        version.commit_groups.iter().map(|g| g.title.as_str()).collect()
    }

    #[test]
    fn test_groups_sorted_by_title() {
        let config = Config::default().validate().unwrap();
        let version = build_version(
            segment(&config, &["fix: b", "feat: a", "chore: c", "perf: d"]),
            &config,
        );
        assert_eq!(
            titles(&version),
            vec!["Bug Fixes", "Features", "Performance Improvements", "chore"]
        );
    }

    #[test]
    fn test_untyped_commits_join_no_group() {
        let config = Config::default().validate().unwrap();
        let version = build_version(segment(&config, &["feat: a", "update readme"]), &config);
        assert_eq!(version.commits.len(), 2);
        assert_eq!(titles(&version), vec!["Features"]);
    }

    #[test]
    fn test_reverts_and_merges_get_their_own_lists() {
        let config = Config::default().validate().unwrap();
        let version = build_version(
            segment(
                &config,
                &[
                    "Revert \"feat: a\"",
                    "Merge pull request #3 from x/y",
                    "feat: b",
                ],
            ),
            &config,
        );
        assert_eq!(version.revert_commits.len(), 1);
        assert_eq!(version.merge_commits.len(), 1);
        assert_eq!(titles(&version), vec!["Features"]);
    }

    #[test]
    fn test_shared_title_merges_groups() {
        let config = Config::keep_a_changelog().validate().unwrap();
        let version = build_version(
            segment(&config, &["refactor: r1", "feat: f1", "perf: p1", "fix: x1"]),
            &config,
        );
        assert_eq!(titles(&version), vec!["Added", "Changed", "Fixed"]);
        let changed: Vec<&str> = version.commit_groups[1]
            .commits
            .iter()
            .map(|c| c.subject())
            .collect();
        assert_eq!(changed, vec!["r1", "p1"]);
    }

    #[test]
    fn test_first_seen_order_when_unsorted() {
        let config = Config {
            group_sort: "none".into(),
            ..Config::default()
        }
        .validate()
        .unwrap();
        let version = build_version(segment(&config, &["fix: b", "feat: a", "fix: c"]), &config);
        assert_eq!(titles(&version), vec!["Bug Fixes", "Features"]);
        assert_eq!(version.commit_groups[0].commits.len(), 2);
    }

    #[test]
    fn test_case_insensitive_keys_share_a_group() {
        let config = Config {
            case_insensitive: true,
            ..Config::default()
        }
        .validate()
        .unwrap();
        let version = build_version(segment(&config, &["feat: a", "FEAT: b"]), &config);
        assert_eq!(version.commit_groups.len(), 1);
        assert_eq!(version.commit_groups[0].key, "feat");
        assert_eq!(version.commit_groups[0].commits.len(), 2);
    }

    #[test]
    fn test_note_groups_use_configured_titles() {
        let config = Config {
            note_titles: vec![TitleEntry::new("BREAKING CHANGE", "Breaking Changes")],
            ..Config::default()
        }
        .validate()
        .unwrap();
        let version = build_version(
            segment(
                &config,
                &[
                    "feat: a\n\nBREAKING CHANGE: first",
                    "fix: b\n\nBREAKING CHANGE: second",
                ],
            ),
            &config,
        );
        assert_eq!(version.note_groups.len(), 1);
        let group = &version.note_groups[0];
        assert_eq!(group.title, "Breaking Changes");
        let bodies: Vec<&str> = group.notes.iter().map(|n| n.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second"]);
    }
}
