//! Field filtering and single-key commit sorting.

use std::cmp::Ordering;

use crate::commit::Commit;
use crate::config::{keys_equal, CommitField, FieldFilters};

/// Whether `commit` passes every field filter.
///
/// Reverts and merges always pass so they can reach their own sections.
pub fn accepts(commit: &Commit, filters: &FieldFilters, case_insensitive: bool) -> bool {
    if commit.is_revert() || commit.is_merge() {
        return true;
    }
    filters.iter().all(|(field, values)| {
        let actual = commit.field(field);
        values
            .iter()
            .any(|v| keys_equal(v, &actual, case_insensitive))
    })
}

/// Keep the commits accepted by `filters`, preserving order.
pub fn filter_commits(
    commits: Vec<Commit>,
    filters: &FieldFilters,
    case_insensitive: bool,
) -> Vec<Commit> {
    if filters.is_empty() {
        return commits;
    }
    commits
        .into_iter()
        .filter(|c| accepts(c, filters, case_insensitive))
        .collect()
}

/// Stable sort by one field; ties keep log order (newest first).
///
/// `Date` sorts newest first, every other field ascending. `None` restores
/// plain log order.
pub fn sort_commits(commits: &mut [Commit], sort_by: Option<CommitField>) {
    commits.sort_by(|a, b| compare(a, b, sort_by).then_with(|| a.position().cmp(&b.position())));
}

fn compare(a: &Commit, b: &Commit, sort_by: Option<CommitField>) -> Ordering {
    match sort_by {
        None => Ordering::Equal,
        Some(CommitField::Date) => b.timestamp().cmp(&a.timestamp()),
        Some(field) => a.field(field).cmp(&b.field(field)),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::commit::CommitBuilder;
    use crate::config::Config;
    use crate::git::RawCommit;

    fn commits(messages: &[(&str, usize)]) -> Vec<Commit> {
        let config = Config::default().validate().unwrap();
        let builder = CommitBuilder::new(&config);
        messages
            .iter()
            .enumerate()
            .map(|(i, (message, parents))| {
                let raw = RawCommit::from_message(
                    format!("{:040x}", i),
                    (0..*parents).map(|p| format!("p{p}")).collect(),
                    "Test User",
                    "test@example.com",
                    Utc.timestamp_opt(1_700_000_000 - i as i64 * 60, 0).unwrap(),
                    message,
                );
                builder.build(&raw, i)
            })
            .collect()
    }

    fn subjects(commits: &[Commit]) -> Vec<&str> {
        commits.iter().map(|c| c.subject()).collect()
    }

    #[test]
    fn test_filter_by_type() {
        let all = commits(&[
            ("feat(api): add token refresh", 1),
            ("fix: null pointer in parser", 1),
            ("chore: bump deps", 1),
        ]);
        let filters = FieldFilters::new().with(CommitField::Type, ["feat", "fix"]);
        let kept = filter_commits(all, &filters, false);
        assert_eq!(
            subjects(&kept),
            vec!["add token refresh", "null pointer in parser"]
        );
    }

    #[test]
    fn test_empty_filters_accept_all() {
        let all = commits(&[("chore: a", 1), ("random", 1)]);
        assert_eq!(filter_commits(all.clone(), &FieldFilters::new(), false), all);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let all = commits(&[
            ("feat: a", 1),
            ("docs: b", 1),
            ("fix(x): c", 1),
            ("Revert \"feat: a\"", 1),
        ]);
        let filters = FieldFilters::new().with(CommitField::Type, ["feat", "fix"]);
        let once = filter_commits(all, &filters, false);
        let twice = filter_commits(once.clone(), &filters, false);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_reverts_and_merges_bypass_filters() {
        let all = commits(&[
            ("Revert \"feat: a\"", 1),
            ("Merge branch 'x'", 2),
            ("docs: nope", 1),
        ]);
        let filters = FieldFilters::new().with(CommitField::Type, ["feat"]);
        let kept = filter_commits(all, &filters, false);
        assert_eq!(kept.len(), 2);
        assert!(kept[0].is_revert());
        assert!(kept[1].is_merge());
    }

    #[test]
    fn test_filter_respects_case_setting() {
        let all = commits(&[("FEAT: shout", 1)]);
        let filters = FieldFilters::new().with(CommitField::Type, ["feat"]);
        assert!(filter_commits(all.clone(), &filters, false).is_empty());
        assert_eq!(filter_commits(all, &filters, true).len(), 1);
    }

    #[test]
    fn test_sort_by_scope_is_stable() {
        let mut all = commits(&[
            ("feat(b): first b", 1),
            ("feat(a): first a", 1),
            ("feat(b): second b", 1),
            ("feat(a): second a", 1),
        ]);
        sort_commits(&mut all, Some(CommitField::Scope));
        assert_eq!(
            subjects(&all),
            vec!["first a", "second a", "first b", "second b"]
        );
    }

    #[test]
    fn test_sort_none_restores_log_order() {
        let mut all = commits(&[("feat(b): x", 1), ("feat(a): y", 1)]);
        sort_commits(&mut all, Some(CommitField::Scope));
        sort_commits(&mut all, None);
        assert_eq!(subjects(&all), vec!["x", "y"]);
    }

    #[test]
    fn test_sort_by_date_newest_first() {
        let mut all = commits(&[("feat: new", 1), ("feat: old", 1)]);
        all.reverse();
        sort_commits(&mut all, Some(CommitField::Date));
        assert_eq!(subjects(&all), vec!["new", "old"]);
    }
}
