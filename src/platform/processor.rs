//! URL builders for commits, issues, merge requests, users and version
//! comparisons, plus Markdown autolinking of commit text.

use std::sync::{Arc, LazyLock};

use regex_lite::{Captures, Regex};

use crate::commit::IssueRef;

use super::Platform;

/// Builds links into a hosting platform.
///
/// Returning `None` means the platform has no such link; templates must
/// render without it.
pub trait Processor: Send + Sync {
    fn commit_url(&self, hash: &str) -> Option<String>;

    fn issue_url(&self, reference: &IssueRef) -> Option<String>;

    /// Link to merge request `!number`. Only GitLab has these.
    fn merge_request_url(&self, number: &str) -> Option<String>;

    /// Profile link for an `@user` mention.
    fn mention_url(&self, user: &str) -> Option<String>;

    /// Link comparing `from` (older) with `to` (newer).
    fn compare_url(&self, from: &str, to: &str) -> Option<String>;
}

/// Links for GitHub, GitLab and Bitbucket, plus an optional external issue
/// tracker for project-key references like `CORE-12`.
#[derive(Debug, Clone)]
pub struct HostedProcessor {
    platform: Platform,
    repository_url: String,
    /// Scheme and host of `repository_url`, e.g. `https://github.com`.
    host_url: String,
    issue_tracker_url: Option<String>,
}

impl HostedProcessor {
    pub fn new(
        platform: Platform,
        repository_url: impl Into<String>,
        issue_tracker_url: Option<String>,
    ) -> Self {
        let repository_url = repository_url.into().trim_end_matches('/').to_string();
        Self {
            platform,
            host_url: host_url(&repository_url),
            repository_url,
            issue_tracker_url: issue_tracker_url.map(|u| u.trim_end_matches('/').to_string()),
        }
    }
}

fn host_url(repository_url: &str) -> String {
    match repository_url.split_once("://") {
        Some((scheme, rest)) => {
            let host = rest.split('/').next().unwrap_or_default();
            format!("{scheme}://{host}")
        }
        None => repository_url.to_string(),
    }
}

impl Processor for HostedProcessor {
    fn commit_url(&self, hash: &str) -> Option<String> {
        let base = &self.repository_url;
        match self.platform {
            Platform::GitHub => Some(format!("{base}/commit/{hash}")),
            Platform::GitLab => Some(format!("{base}/-/commit/{hash}")),
            Platform::Bitbucket => Some(format!("{base}/commits/{hash}")),
            Platform::None => None,
        }
    }

    fn issue_url(&self, reference: &IssueRef) -> Option<String> {
        if reference.project().is_some() {
            return self
                .issue_tracker_url
                .as_ref()
                .map(|tracker| format!("{tracker}/browse/{reference}"));
        }
        let base = &self.repository_url;
        let number = reference.number();
        match self.platform {
            Platform::GitHub | Platform::Bitbucket => Some(format!("{base}/issues/{number}")),
            Platform::GitLab => Some(format!("{base}/-/issues/{number}")),
            Platform::None => None,
        }
    }

    fn merge_request_url(&self, number: &str) -> Option<String> {
        match self.platform {
            Platform::GitLab => Some(format!("{}/-/merge_requests/{number}", self.repository_url)),
            Platform::GitHub | Platform::Bitbucket | Platform::None => None,
        }
    }

    fn mention_url(&self, user: &str) -> Option<String> {
        let host = &self.host_url;
        match self.platform {
            Platform::GitHub | Platform::GitLab => Some(format!("{host}/{user}")),
            Platform::Bitbucket => Some(format!("{host}/{user}/")),
            Platform::None => None,
        }
    }

    fn compare_url(&self, from: &str, to: &str) -> Option<String> {
        let base = &self.repository_url;
        match self.platform {
            Platform::GitHub => Some(format!("{base}/compare/{from}...{to}")),
            Platform::GitLab => Some(format!("{base}/-/compare/{from}...{to}")),
            Platform::Bitbucket => Some(format!("{base}/branches/compare/{to}..{from}")),
            Platform::None => None,
        }
    }
}

/// Produces no links at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProcessor;

impl Processor for NullProcessor {
    fn commit_url(&self, _hash: &str) -> Option<String> {
        None
    }

    fn issue_url(&self, _reference: &IssueRef) -> Option<String> {
        None
    }

    fn merge_request_url(&self, _number: &str) -> Option<String> {
        None
    }

    fn mention_url(&self, _user: &str) -> Option<String> {
        None
    }

    fn compare_url(&self, _from: &str, _to: &str) -> Option<String> {
        None
    }
}

/// Pick the processor for a platform. Without a repository URL only
/// tracker links could be built, so nothing is linked.
pub fn processor_for(
    platform: Platform,
    repository_url: Option<&str>,
    issue_tracker_url: Option<&str>,
) -> Arc<dyn Processor> {
    match repository_url {
        Some(url) if platform != Platform::None || issue_tracker_url.is_some() => Arc::new(
            HostedProcessor::new(platform, url, issue_tracker_url.map(str::to_string)),
        ),
        _ => Arc::new(NullProcessor),
    }
}

/// A mention, an issue reference or a merge request, starting a word.
const AUTOLINK_PATTERN: &str =
    r"(^|[^\w.@/\[!#-])(?:@([\w-]+)|((?:#|gh-)\d+|[A-Z][A-Z0-9]+-\d+)\b|!(\d+)\b)";

static AUTOLINK: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(AUTOLINK_PATTERN).ok());

/// Rewrite `@user`, `#12`, `gh-12`, `KEY-12` and `!12` in `text` as Markdown
/// links. Anything the processor has no link for is left as written.
pub fn autolink(processor: &dyn Processor, text: &str) -> String {
    let Some(pattern) = AUTOLINK.as_ref() else {
        return text.to_string();
    };

    pattern
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let lead = caps.get(1).map_or("", |m| m.as_str());
            let token = &whole[lead.len()..];

            let url = if let Some(user) = caps.get(2) {
                processor.mention_url(user.as_str())
            } else if let Some(reference) = caps.get(3) {
                IssueRef::parse(reference.as_str()).and_then(|r| processor.issue_url(&r))
            } else if let Some(number) = caps.get(4) {
                processor.merge_request_url(number.as_str())
            } else {
                None
            };

            match url {
                Some(url) => format!("{lead}[{token}]({url})"),
                None => whole.to_string(),
            }
        })
        .into_owned()
}
