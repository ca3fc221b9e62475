//! Note keywords, issue references, ref actions, mentions and trailers
//! found in commit text.

use std::fmt;

use regex_lite::{Regex, RegexBuilder};
use serde::{Serialize, Serializer};

use crate::config::keys_equal;
use crate::error::ConfigError;

/// Project key + dash + digits, or `#`/`gh-` + digits.
const ISSUE_REF_PATTERN: &str = r"\b([A-Z][A-Z0-9]+)-(\d+)\b|(?:#|\bgh-)(\d+)\b";

/// `@user`, not preceded by a word character so email addresses don't count.
const MENTION_PATTERN: &str = r"(?:^|[^\w.@/])@([\w-]+)";

const SIGNER_PATTERN: &str = r"^(?i:signed-off-by):\s*(.+?)\s*<([^<>\s]+)>\s*$";
const CO_AUTHOR_PATTERN: &str = r"^(?i:co-authored-by):\s*(.+?)\s*<([^<>\s]+)>\s*$";

/// Words that close an issue when they precede a reference.
pub const DEFAULT_REF_ACTIONS: [&str; 9] = [
    "close", "closes", "closed", "fix", "fixes", "fixed", "resolve", "resolves", "resolved",
];

/// Markers opening and closing a fenced code block.
const FENCES: [&str; 2] = ["```", "~~~"];

/// A keyword annotation found in a commit body, e.g. `BREAKING CHANGE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    /// The configured keyword (its configured spelling, not the matched one).
    pub keyword: String,
    pub body: String,
}

/// An issue reference: `PROJ-123`, `#123` or `gh-123`.
///
/// `gh-123` is the same reference as `#123` and displays as such.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueRef {
    project: Option<String>,
    number: String,
}

impl IssueRef {
    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Parse a single reference such as `#12`, `gh-12` or `CORE-7`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(digits) = text.strip_prefix('#').or_else(|| text.strip_prefix("gh-")) {
            return is_digits(digits).then(|| Self {
                project: None,
                number: digits.to_string(),
            });
        }

        let (project, digits) = text.rsplit_once('-')?;
        let mut chars = project.chars();
        let valid_project = chars.next().is_some_and(|c| c.is_ascii_uppercase())
            && project.len() > 1
            && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        (valid_project && is_digits(digits)).then(|| Self {
            project: Some(project.to_string()),
            number: digits.to_string(),
        })
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

impl fmt::Display for IssueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.project {
            Some(project) => write!(f, "{}-{}", project, self.number),
            None => write!(f, "#{}", self.number),
        }
    }
}

impl Serialize for IssueRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// An issue reference preceded by an action word, e.g. `Closes #12`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefAction {
    /// The action word as written.
    pub action: String,
    /// `owner/repo` for a reference into another repository.
    pub source: Option<String>,
    #[serde(rename = "ref")]
    pub reference: IssueRef,
}

/// A person named in a `Signed-off-by` or `Co-authored-by` trailer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
}

/// Follows fenced code blocks line by line.
#[derive(Debug, Default)]
struct FenceTracker {
    open: Option<&'static str>,
}

impl FenceTracker {
    /// Feed the next line. True when it is a fence or lies inside one.
    fn is_code(&mut self, line: &str) -> bool {
        let marker = FENCES.into_iter().find(|fence| line.starts_with(*fence));
        match (self.open, marker) {
            (None, Some(fence)) => {
                self.open = Some(fence);
                true
            }
            (Some(open), Some(fence)) if open == fence => {
                self.open = None;
                true
            }
            (Some(_), _) => true,
            (None, None) => false,
        }
    }
}

/// Lines of `text` outside fenced code blocks.
fn prose_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut fence = FenceTracker::default();
    text.lines().filter(move |line| !fence.is_code(line))
}

fn compile(name: &'static str, pattern: String, ci: bool) -> Result<Regex, ConfigError> {
    RegexBuilder::new(&pattern)
        .case_insensitive(ci)
        .build()
        .map_err(|source| ConfigError::InvalidPattern {
            name,
            pattern,
            source,
        })
}

/// Scans commit text for note keywords, issue references, ref actions,
/// mentions and contact trailers.
///
/// Text inside fenced code blocks is never scanned.
#[derive(Debug, Clone)]
pub struct NoteExtractor {
    keywords: Vec<String>,
    case_insensitive: bool,
    notes: Option<Regex>,
    refs: Regex,
    ref_actions: Option<Regex>,
    mentions: Regex,
    signers: Regex,
    co_authors: Regex,
}

impl NoteExtractor {
    /// Build an extractor for `keywords`. Keywords are matched literally at
    /// the start of a line and must be followed by `:` or whitespace.
    ///
    /// Ref actions start as [`DEFAULT_REF_ACTIONS`].
    pub fn new(keywords: &[String], case_insensitive: bool) -> Result<Self, ConfigError> {
        let mut keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        keywords.dedup();

        let notes = if keywords.is_empty() {
            None
        } else {
            // Longest first so `BREAKING CHANGE` wins over `BREAKING`.
            let mut alternatives: Vec<&String> = keywords.iter().collect();
            alternatives.sort_by_key(|k| std::cmp::Reverse(k.len()));
            let pattern = format!(r"^({})(?::|\s)\s*(.*)$", alternation(&alternatives));
            Some(compile("note keyword", pattern, case_insensitive)?)
        };

        let extractor = Self {
            keywords,
            case_insensitive,
            notes,
            refs: compile("issue reference", ISSUE_REF_PATTERN.to_string(), false)?,
            ref_actions: None,
            mentions: compile("mention", MENTION_PATTERN.to_string(), false)?,
            signers: compile("signer", SIGNER_PATTERN.to_string(), false)?,
            co_authors: compile("co-author", CO_AUTHOR_PATTERN.to_string(), false)?,
        };
        extractor.with_ref_actions(&DEFAULT_REF_ACTIONS)
    }

    /// Replace the action words recognized before a reference. Matching is
    /// always case-insensitive. An empty list disables ref actions.
    pub fn with_ref_actions<S: AsRef<str>>(mut self, actions: &[S]) -> Result<Self, ConfigError> {
        let mut actions: Vec<&str> = actions
            .iter()
            .map(|a| a.as_ref().trim())
            .filter(|a| !a.is_empty())
            .collect();
        if actions.is_empty() {
            self.ref_actions = None;
            return Ok(self);
        }

        actions.sort_by_key(|a| std::cmp::Reverse(a.len()));
        let pattern = format!(
            r"\b(?i:({}))\b:?\s+(?:([\w.\-]+/[\w.\-]+))?(#\d+|gh-\d+|[A-Z][A-Z0-9]+-\d+)\b",
            alternation(&actions)
        );
        self.ref_actions = Some(compile("ref action", pattern, false)?);
        Ok(self)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Extract notes from a commit body, in order of appearance.
    ///
    /// A note starts at a line beginning with a keyword; the rest of that
    /// line plus the indented lines directly below it form the body.
    /// Every occurrence yields its own note. A code fence ends the open
    /// note, and keywords inside a fenced block are ignored.
    pub fn extract_notes(&self, body: &str) -> Vec<Note> {
        let Some(pattern) = &self.notes else {
            return Vec::new();
        };

        let mut notes = Vec::new();
        let mut current: Option<(String, Vec<&str>)> = None;
        let mut fence = FenceTracker::default();

        for line in body.lines() {
            if fence.is_code(line) {
                if let Some(open) = current.take() {
                    notes.push(finish_note(open));
                }
                continue;
            }

            if let Some(caps) = pattern.captures(line) {
                if let Some(open) = current.take() {
                    notes.push(finish_note(open));
                }
                let matched = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                let rest = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
                current = Some((self.canonical_keyword(matched), vec![rest]));
                continue;
            }

            let continues = line.starts_with([' ', '\t']) && !line.trim().is_empty();
            match current.as_mut() {
                Some((_, parts)) if continues => parts.push(line.trim()),
                _ => {
                    if let Some(open) = current.take() {
                        notes.push(finish_note(open));
                    }
                }
            }
        }

        if let Some(open) = current.take() {
            notes.push(finish_note(open));
        }
        notes
    }

    /// Issue references in `texts`, deduplicated in first-seen order.
    pub fn extract_refs(&self, texts: &[&str]) -> Vec<IssueRef> {
        let mut refs: Vec<IssueRef> = Vec::new();
        for line in texts.iter().flat_map(|text| prose_lines(text)) {
            for caps in self.refs.captures_iter(line) {
                let issue = match (caps.get(1), caps.get(2), caps.get(3)) {
                    (Some(project), Some(number), _) => IssueRef {
                        project: Some(project.as_str().to_string()),
                        number: number.as_str().to_string(),
                    },
                    (_, _, Some(number)) => IssueRef {
                        project: None,
                        number: number.as_str().to_string(),
                    },
                    _ => continue,
                };
                push_unique(&mut refs, issue);
            }
        }
        refs
    }

    /// References preceded by an action word, e.g. `Fixes acme/api#3`.
    pub fn extract_ref_actions(&self, texts: &[&str]) -> Vec<RefAction> {
        let Some(pattern) = &self.ref_actions else {
            return Vec::new();
        };

        let mut actions = Vec::new();
        for line in texts.iter().flat_map(|text| prose_lines(text)) {
            for caps in pattern.captures_iter(line) {
                let (Some(action), Some(reference)) = (
                    caps.get(1),
                    caps.get(3).and_then(|m| IssueRef::parse(m.as_str())),
                ) else {
                    continue;
                };
                push_unique(
                    &mut actions,
                    RefAction {
                        action: action.as_str().to_string(),
                        source: caps.get(2).map(|m| m.as_str().to_string()),
                        reference,
                    },
                );
            }
        }
        actions
    }

    /// `@user` mentions without the `@`, deduplicated in first-seen order.
    pub fn extract_mentions(&self, texts: &[&str]) -> Vec<String> {
        let mut mentions = Vec::new();
        for line in texts.iter().flat_map(|text| prose_lines(text)) {
            for caps in self.mentions.captures_iter(line) {
                if let Some(user) = caps.get(1) {
                    push_unique(&mut mentions, user.as_str().to_string());
                }
            }
        }
        mentions
    }

    /// People from `Signed-off-by:` trailers.
    pub fn extract_signers(&self, body: &str) -> Vec<Contact> {
        contacts(&self.signers, body)
    }

    /// People from `Co-authored-by:` trailers.
    pub fn extract_co_authors(&self, body: &str) -> Vec<Contact> {
        contacts(&self.co_authors, body)
    }

    fn canonical_keyword(&self, matched: &str) -> String {
        self.keywords
            .iter()
            .find(|k| keys_equal(k, matched, self.case_insensitive))
            .cloned()
            .unwrap_or_else(|| matched.to_string())
    }
}

fn alternation<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|w| regex_lite::escape(w.as_ref()))
        .collect::<Vec<_>>()
        .join("|")
}

fn contacts(pattern: &Regex, body: &str) -> Vec<Contact> {
    let mut found = Vec::new();
    for line in prose_lines(body) {
        if let Some(caps) = pattern.captures(line.trim()) {
            let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let email = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            push_unique(
                &mut found,
                Contact {
                    name: name.to_string(),
                    email: email.to_string(),
                },
            );
        }
    }
    found
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}

fn finish_note((keyword, parts): (String, Vec<&str>)) -> Note {
    Note {
        keyword,
        body: parts.join("\n").trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(case_insensitive: bool) -> NoteExtractor {
        NoteExtractor::new(
            &["BREAKING CHANGE".to_string(), "DEPRECATED".to_string()],
            case_insensitive,
        )
        .unwrap()
    }

    #[test]
    fn test_note_with_indented_continuation() {
        let body = "Some context.\n\nBREAKING CHANGE: the config file moved\n  to ~/.config/app\n\tand is now TOML\nTrailing paragraph.";
        let notes = extractor(false).extract_notes(body);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].keyword, "BREAKING CHANGE");
        assert_eq!(
            notes[0].body,
            "the config file moved\nto ~/.config/app\nand is now TOML"
        );
    }

    #[test]
    fn test_keyword_must_start_the_line() {
        let body = "This is not a BREAKING CHANGE: honestly";
        assert!(extractor(false).extract_notes(body).is_empty());
    }

    #[test]
    fn test_each_occurrence_is_a_note() {
        let body = "BREAKING CHANGE: first\nDEPRECATED: old flag\nBREAKING CHANGE: second";
        let notes = extractor(false).extract_notes(body);
        let pairs: Vec<(&str, &str)> = notes
            .iter()
            .map(|n| (n.keyword.as_str(), n.body.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("BREAKING CHANGE", "first"),
                ("DEPRECATED", "old flag"),
                ("BREAKING CHANGE", "second"),
            ]
        );
    }

    #[test]
    fn test_case_setting_respected() {
        let body = "breaking change: lower case";
        assert!(extractor(false).extract_notes(body).is_empty());

        let notes = extractor(true).extract_notes(body);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].keyword, "BREAKING CHANGE");
        assert_eq!(notes[0].body, "lower case");
    }

    #[test]
    fn test_keyword_without_separator_is_ignored() {
        let body = "BREAKING CHANGES are listed below";
        assert!(extractor(false).extract_notes(body).is_empty());
    }

    #[test]
    fn test_no_keywords_configured() {
        let extractor = NoteExtractor::new(&[], false).unwrap();
        assert!(extractor.extract_notes("BREAKING CHANGE: x").is_empty());
    }

    #[test]
    fn test_refs_dedup_first_seen() {
        let refs = extractor(false).extract_refs(&[
            "fix(parser): handle CORE-12 and #40",
            "Closes #40\nRefs CORE-12, WEB-3",
        ]);
        let rendered: Vec<String> = refs.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["CORE-12", "#40", "WEB-3"]);
    }

    #[test]
    fn test_refs_ignore_lowercase_keys() {
        let refs = extractor(true).extract_refs(&["see core-12"]);
        assert!(refs.is_empty());
    }

    #[test]
    fn test_gh_prefix_is_a_plain_issue() {
        let refs = extractor(false).extract_refs(&["see gh-9 and #9, not sigh-4"]);
        let rendered: Vec<String> = refs.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["#9"]);
        assert_eq!(IssueRef::parse("gh-9"), IssueRef::parse("#9"));
    }

    #[test]
    fn test_keywords_inside_code_fence_are_ignored() {
        let body = "Example output:
```
BREAKING CHANGE: not a real note
```
                    ~~~
DEPRECATED: neither
~~~
BREAKING CHANGE: the real one";
        let notes = extractor(false).extract_notes(body);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].body, "the real one");
    }

    #[test]
    fn test_fence_ends_open_note() {
        let body = "BREAKING CHANGE: renamed the flag
```
  --old becomes --new
```";
        let notes = extractor(false).extract_notes(body);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].body, "renamed the flag");
    }

    #[test]
    fn test_mixed_fence_markers_do_not_close() {
        let body = "```
~~~
BREAKING CHANGE: still code
```
BREAKING CHANGE: prose";
        let notes = extractor(false).extract_notes(body);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].body, "prose");
    }

    #[test]
    fn test_refs_inside_code_fence_are_ignored() {
        let refs = extractor(false).extract_refs(&["Fixes #1
```
log: #2 failed
```"]);
        let rendered: Vec<String> = refs.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["#1"]);
    }

    #[test]
    fn test_ref_actions() {
        let actions = extractor(false).extract_ref_actions(&[
            "fix(api): handle empty token, closes #12",
            "Fixes: acme/api#3
Resolves CORE-8
Related to #12
Resolves gh-40",
        ]);
        let summary: Vec<(&str, Option<&str>, String)> = actions
            .iter()
            .map(|a| (a.action.as_str(), a.source.as_deref(), a.reference.to_string()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("closes", None, "#12".to_string()),
                ("Fixes", Some("acme/api"), "#3".to_string()),
                ("Resolves", None, "CORE-8".to_string()),
                ("Resolves", None, "#40".to_string()),
            ]
        );
    }

    #[test]
    fn test_custom_ref_actions() {
        let extractor = extractor(false).with_ref_actions(&["Implements"]).unwrap();
        let actions = extractor.extract_ref_actions(&["Implements #5
Closes #6"]);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action, "Implements");

        let none = extractor.with_ref_actions::<&str>(&[]).unwrap();
        assert!(none.extract_ref_actions(&["Closes #6"]).is_empty());
    }

    #[test]
    fn test_mentions_skip_emails() {
        let mentions = extractor(false).extract_mentions(&[
            "feat: thanks @ada-l and @bob",
            "Reviewed by @bob
Signed-off-by: Ada <ada@example.com>",
        ]);
        assert_eq!(mentions, vec!["ada-l", "bob"]);
    }

    #[test]
    fn test_signers_and_co_authors() {
        let body = "Body text.

Signed-off-by: Ada Lovelace <ada@example.com>
                    Co-authored-by: Grace Hopper <grace@navy.mil>
                    co-authored-by: Alan Turing <alan@bletchley.uk>
                    Signed-off-by: Ada Lovelace <ada@example.com>";
        let signers = extractor(false).extract_signers(body);
        assert_eq!(
            signers,
            vec![Contact {
                name: "Ada Lovelace".into(),
                email: "ada@example.com".into()
            }]
        );
        let co_authors: Vec<String> = extractor(false)
            .extract_co_authors(body)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(co_authors, vec!["Grace Hopper", "Alan Turing"]);
    }

    #[test]
    fn test_issue_ref_parse() {
        let r = IssueRef::parse("#17").unwrap();
        assert_eq!(r.number(), "17");
        assert_eq!(r.project(), None);

        let r = IssueRef::parse("AB2-9").unwrap();
        assert_eq!(r.project(), Some("AB2"));
        assert_eq!(r.to_string(), "AB2-9");

        assert!(IssueRef::parse("ab-9").is_none());
        assert!(IssueRef::parse("A-9").is_none());
        assert!(IssueRef::parse("#x").is_none());
    }
}
