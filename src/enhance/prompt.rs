//! Prompt construction for subject enhancement.

use crate::llm::ChatMessage;

/// Line separating per-subject blocks in requests and responses.
pub const DELIMITER: &str = "---COMMIT---";

const SYSTEM_PROMPT: &str =
    "You rewrite git commit subjects into clear, user-facing changelog entries.";

/// Sanitize commit text before passing it to the model to prevent prompt injection.
pub fn sanitize_for_prompt(text: &str) -> String {
    text.replace("```", "'''")
        .replace("##", "//")
        .lines()
        .take(50)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the conversation for one chunk of subjects.
pub fn build_messages(subjects: &[&str]) -> Vec<ChatMessage> {
    let listed = subjects
        .iter()
        .map(|s| sanitize_for_prompt(s))
        .collect::<Vec<_>>()
        .join(&format!("\n{DELIMITER}\n"));

    let prompt = format!(
        r#"Rewrite each commit subject below as a concise changelog entry.

Rules:
1. Keep the original meaning; do not invent changes.
2. If one subject bundles several independent changes, write one line per change.
3. Output one block per subject, in the same order, separated by a line containing only {DELIMITER}
4. Output only the entries, no commentary.

Subjects ({count}):
{listed}"#,
        count = subjects.len(),
    );

    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)]
}
