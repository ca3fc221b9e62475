//! Fallback rules for the batch enhancer, in one place.

use std::fmt;

/// What happened to one subject during a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Shorter than the minimum length; never sent.
    TooShort,
    /// Already seen earlier in the input.
    Duplicate,
    /// The request for its chunk failed or timed out.
    RequestFailed,
    /// The response had no section for it.
    SectionMissing,
    /// Its section had no usable lines.
    SectionEmpty,
    /// Its section produced at least one line.
    Rewritten,
}

/// What the enhancer returns for a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Return the subject as-is without asking.
    PassThrough,
    /// Reuse the result of the first occurrence.
    Broadcast,
    /// Return the subject as-is after a failed attempt.
    KeepOriginal,
    /// Return the rewritten lines.
    UseRewrite,
}

pub const DECISION_TABLE: [(Condition, Action); 6] = [
    (Condition::TooShort, Action::PassThrough),
    (Condition::Duplicate, Action::Broadcast),
    (Condition::RequestFailed, Action::KeepOriginal),
    (Condition::SectionMissing, Action::KeepOriginal),
    (Condition::SectionEmpty, Action::KeepOriginal),
    (Condition::Rewritten, Action::UseRewrite),
];

/// Look up the row for `condition`. A condition without a row keeps the
/// original subject.
pub fn action_for(condition: Condition) -> Action {
    DECISION_TABLE
        .iter()
        .find(|(c, _)| *c == condition)
        .map(|(_, action)| *action)
        .unwrap_or(Action::KeepOriginal)
}

impl Condition {
    /// Whether reaching this condition means the enhancer fell back.
    pub fn is_fallback(&self) -> bool {
        action_for(*self) == Action::KeepOriginal
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TooShort => "too-short",
            Self::Duplicate => "duplicate",
            Self::RequestFailed => "request-failed",
            Self::SectionMissing => "section-missing",
            Self::SectionEmpty => "section-empty",
            Self::Rewritten => "rewritten",
        })
    }
}

/// The outcome for one unique subject in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub subject: String,
    pub condition: Condition,
    /// Cleaned response lines; empty unless `Rewritten`.
    pub lines: Vec<String>,
}

impl Decision {
    pub fn new(subject: impl Into<String>, condition: Condition) -> Self {
        Self {
            subject: subject.into(),
            condition,
            lines: Vec::new(),
        }
    }

    pub fn rewritten(subject: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            subject: subject.into(),
            condition: Condition::Rewritten,
            lines,
        }
    }

    /// The subjects this decision resolves to.
    pub fn resolve(self) -> Vec<String> {
        match action_for(self.condition) {
            Action::UseRewrite => self.lines,
            Action::PassThrough | Action::KeepOriginal | Action::Broadcast => vec![self.subject],
        }
    }
}
