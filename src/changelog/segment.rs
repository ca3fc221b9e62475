//! Version segmentation at release tags, and release ordering.

use std::collections::HashMap;

use semver::Version as SemVersion;
use tracing::debug;

use crate::commit::Commit;
use crate::config::{ChangelogConfig, VersionSort};
use crate::git::RawTag;

use super::model::{RelatedTag, Tag};

/// Commits belonging to one version, before grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub tag: Option<Tag>,
    pub previous: Option<RelatedTag>,
    pub commits: Vec<Commit>,
}

/// Extract a semver version from a tag name.
/// Handles both "v1.2.3" and "1.2.3" formats.
pub fn version_from_tag(tag_name: &str) -> Option<SemVersion> {
    let version_str = tag_name.strip_prefix('v').unwrap_or(tag_name);
    SemVersion::parse(version_str).ok()
}

/// Order release tags newest first and link each to its predecessor.
///
/// Date mode sorts by tag date (name breaks ties). Semver mode first sorts
/// by date, then rearranges only the tags that parse as semver among their
/// own slots, highest first; the others keep their date position.
pub fn order_tags(tags: &[RawTag], sort: VersionSort) -> Vec<Tag> {
    let mut sorted: Vec<&RawTag> = tags.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.name.cmp(&a.name)));

    if sort == VersionSort::Semver {
        let mut slots = Vec::new();
        let mut versioned = Vec::new();
        for (slot, tag) in sorted.iter().enumerate() {
            match version_from_tag(&tag.name) {
                Some(version) => {
                    slots.push(slot);
                    versioned.push((version, *tag));
                }
                None => debug!(tag = %tag.name, "Tag is not semver, keeping its date position"),
            }
        }
        versioned.sort_by(|(a, _), (b, _)| b.cmp(a));
        for (slot, (_, tag)) in slots.into_iter().zip(versioned) {
            sorted[slot] = tag;
        }
    }

    let mut ordered: Vec<Tag> = sorted
        .iter()
        .map(|t| Tag {
            name: t.name.clone(),
            date: t.date,
            previous: None,
        })
        .collect();
    for i in 0..ordered.len().saturating_sub(1) {
        ordered[i].previous = Some(ordered[i + 1].related());
    }
    ordered
}

/// Partition `commits` into versions.
///
/// `log_hashes` is the full fetched log, newest first; a commit's position
/// in it decides its version, so a release tag still bounds a version when
/// its own commit was filtered out. Release tags whose commit is outside
/// the log only provide `previous` links. Each commit lands in exactly one
/// segment, keeping the incoming order.
///
/// Output: the Unreleased segment (only when non-empty, or named after
/// `next_tag` when configured), then one segment per release tag in range,
/// in release order.
pub fn segment(
    commits: Vec<Commit>,
    log_hashes: &[String],
    tags: &[RawTag],
    config: &ChangelogConfig,
) -> Vec<Segment> {
    let releases: Vec<RawTag> = tags
        .iter()
        .filter(|t| config.is_release_tag(&t.name))
        .cloned()
        .collect();
    let ordered = order_tags(&releases, config.version_sort);

    let positions: HashMap<&str, usize> = log_hashes
        .iter()
        .enumerate()
        .map(|(i, h)| (h.as_str(), i))
        .collect();
    let targets: HashMap<&str, &str> = releases
        .iter()
        .map(|t| (t.name.as_str(), t.target.as_str()))
        .collect();

    // (log position, index in `ordered`) for every release inside the log.
    let mut boundaries: Vec<(usize, usize)> = ordered
        .iter()
        .enumerate()
        .filter_map(|(idx, tag)| {
            let target = targets.get(tag.name.as_str())?;
            positions.get(target).map(|pos| (*pos, idx))
        })
        .collect();
    boundaries.sort_unstable();

    let mut unreleased = Vec::new();
    let mut buckets: HashMap<usize, Vec<Commit>> = HashMap::new();
    for commit in commits {
        match owner(&boundaries, commit.position()) {
            Some(idx) => buckets.entry(idx).or_default().push(commit),
            None => unreleased.push(commit),
        }
    }

    let newest = ordered.first().map(Tag::related);
    let mut segments = Vec::new();

    if let Some(next) = &config.next_tag {
        if !unreleased.is_empty() {
            let date = unreleased
                .iter()
                .map(Commit::timestamp)
                .max()
                .unwrap_or_default();
            segments.push(Segment {
                tag: Some(Tag {
                    name: next.clone(),
                    date,
                    previous: newest.clone(),
                }),
                previous: newest,
                commits: unreleased,
            });
        }
    } else if !unreleased.is_empty() {
        segments.push(Segment {
            tag: None,
            previous: newest,
            commits: unreleased,
        });
    }

    let mut in_range: Vec<usize> = boundaries.iter().map(|(_, idx)| *idx).collect();
    in_range.sort_unstable();
    for idx in in_range {
        let tag = ordered[idx].clone();
        segments.push(Segment {
            previous: tag.previous.clone(),
            tag: Some(tag),
            commits: buckets.remove(&idx).unwrap_or_default(),
        });
    }

    segments
}

/// The release owning a commit at `position`: the nearest boundary at or
/// below it in the log, and among releases on that same commit the first in
/// release order.
fn owner(boundaries: &[(usize, usize)], position: usize) -> Option<usize> {
    let upto = boundaries.partition_point(|(pos, _)| *pos <= position);
    if upto == 0 {
        return None;
    }
    let nearest = boundaries[upto - 1].0;
    let first = boundaries.partition_point(|(pos, _)| *pos < nearest);
    Some(boundaries[first].1)
}
