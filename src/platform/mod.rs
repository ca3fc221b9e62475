//! Hosting platforms and the link builders templates call into.

pub mod processor;

pub use processor::{autolink, processor_for, HostedProcessor, NullProcessor, Processor};

/// Code hosting platform of the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    GitHub,
    GitLab,
    Bitbucket,
    #[default]
    None,
}

impl Platform {
    /// Select a platform by identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_lowercase().as_str() {
            "github" => Some(Self::GitHub),
            "gitlab" => Some(Self::GitLab),
            "bitbucket" => Some(Self::Bitbucket),
            "" | "none" => Some(Self::None),
            _ => None,
        }
    }

    /// Guess the platform from a repository URL's host.
    pub fn detect(url: &str) -> Self {
        let host = url
            .split_once("://")
            .map_or(url, |(_, rest)| rest)
            .split(['/', ':'])
            .next()
            .unwrap_or_default()
            .rsplit('@')
            .next()
            .unwrap_or_default()
            .to_lowercase();

        match host.as_str() {
            "github.com" | "www.github.com" => Self::GitHub,
            "gitlab.com" | "www.gitlab.com" => Self::GitLab,
            "bitbucket.org" | "www.bitbucket.org" => Self::Bitbucket,
            _ => Self::None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::GitLab => "gitlab",
            Self::Bitbucket => "bitbucket",
            Self::None => "none",
        }
    }
}
