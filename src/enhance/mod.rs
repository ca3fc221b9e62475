//! Optional AI rewriting of commit subjects.
//!
//! Strictly best-effort: whatever the completion client does, every input
//! subject comes back, rewritten or unchanged.

pub mod batch;
pub mod decision;
pub mod parse;
pub mod prompt;

pub use batch::{BatchEnhancer, EnhancerOptions};
pub use decision::{action_for, Action, Condition, Decision, DECISION_TABLE};
pub use prompt::{sanitize_for_prompt, DELIMITER};
