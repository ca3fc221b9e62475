//! Header classification against a configured structural pattern.

use regex_lite::{Regex, RegexBuilder};
use tracing::debug;

use crate::config::CommitField;
use crate::error::ConfigError;

/// Conventional commit header: `type(scope)!: subject`.
pub const DEFAULT_HEADER_PATTERN: &str = r"^(\w*)(?:\(([\w\$\.\-\*\s/]*)\))?!?:\s(.*)$";

/// Fields captured from one header line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderFields {
    pub commit_type: String,
    pub scope: String,
    pub subject: String,
    /// `true` when the whole pattern matched.
    pub matched: bool,
    /// `true` when the matched header carries a `!` marker before the colon.
    pub breaking: bool,
}

impl HeaderFields {
    fn unmatched(line: &str) -> Self {
        Self {
            subject: line.to_string(),
            ..Self::default()
        }
    }
}

/// Compiled header pattern with its ordered capture-group field map.
#[derive(Debug, Clone)]
pub struct HeaderPattern {
    regex: Regex,
    fields: Vec<CommitField>,
}

impl HeaderPattern {
    /// Compile `pattern`, mapping capture group `i + 1` onto `fields[i]`.
    ///
    /// Only Type, Scope and Subject can be captured, each at most once, and
    /// the pattern must have at least as many groups as mapped fields.
    pub fn compile(
        pattern: &str,
        fields: &[CommitField],
        case_insensitive: bool,
    ) -> Result<Self, ConfigError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|source| ConfigError::InvalidPattern {
                name: "header",
                pattern: pattern.to_string(),
                source,
            })?;

        for (i, field) in fields.iter().enumerate() {
            if !field.is_header_capture() {
                return Err(ConfigError::UnsupportedHeaderField(field.to_string()));
            }
            if fields[..i].contains(field) {
                return Err(ConfigError::DuplicateHeaderField(field.to_string()));
            }
        }

        let groups = regex.captures_len().saturating_sub(1);
        if fields.is_empty() || fields.len() > groups {
            return Err(ConfigError::HeaderFieldMismatch {
                groups,
                fields: fields.len(),
            });
        }

        Ok(Self {
            regex,
            fields: fields.to_vec(),
        })
    }

    /// The conventional-commit pattern mapped to Type, Scope, Subject.
    pub fn conventional(case_insensitive: bool) -> Result<Self, ConfigError> {
        Self::compile(
            DEFAULT_HEADER_PATTERN,
            &[CommitField::Type, CommitField::Scope, CommitField::Subject],
            case_insensitive,
        )
    }

    pub fn fields(&self) -> &[CommitField] {
        &self.fields
    }

    /// Split `line` into its mapped fields.
    ///
    /// Matching is all-or-nothing: when the pattern does not match the whole
    /// line the result is unmatched, with empty Type/Scope and the raw line as
    /// Subject. This never fails.
    pub fn classify(&self, line: &str) -> HeaderFields {
        let caps = self
            .regex
            .captures(line)
            .filter(|caps| caps.get(0).is_some_and(|m| m.start() == 0 && m.end() == line.len()));
        let Some(caps) = caps else {
            debug!(header = %line, "Header did not match pattern, classifying as unmatched");
            return HeaderFields::unmatched(line);
        };

        let mut out = HeaderFields {
            subject: line.to_string(),
            matched: true,
            ..HeaderFields::default()
        };

        for (i, field) in self.fields.iter().enumerate() {
            let value = caps.get(i + 1).map(|m| m.as_str()).unwrap_or_default();
            match field {
                CommitField::Type => out.commit_type = value.to_string(),
                CommitField::Scope => out.scope = value.to_string(),
                CommitField::Subject => out.subject = value.to_string(),
                _ => {}
            }
        }

        out.breaking = line
            .split_once(':')
            .is_some_and(|(prefix, _)| prefix.ends_with('!'));

        out
    }
}
