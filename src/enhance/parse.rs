//! Response splitting and line cleanup.

use super::prompt::DELIMITER;

/// Split a response into per-subject sections on delimiter lines.
///
/// Blank sections at either end (a leading or trailing delimiter) are dropped.
pub fn split_sections(text: &str) -> Vec<String> {
    let mut sections = vec![String::new()];
    for line in text.lines() {
        if line.trim() == DELIMITER {
            sections.push(String::new());
        } else if let Some(current) = sections.last_mut() {
            current.push_str(line);
            current.push('\n');
        }
    }

    while sections.first().is_some_and(|s| s.trim().is_empty()) {
        sections.remove(0);
    }
    while sections.last().is_some_and(|s| s.trim().is_empty()) {
        sections.pop();
    }
    sections
}

/// Non-empty lines of a section with list markers removed, dropping lines
/// shorter than `min_len` characters.
pub fn clean_lines(section: &str, min_len: usize) -> Vec<String> {
    section
        .lines()
        .map(strip_marker)
        .filter(|line| line.chars().count() >= min_len.max(1))
        .map(str::to_string)
        .collect()
}

/// Strip a leading bullet (`-`, `*`, `+`, `•`) or number (`1.`, `2)`).
fn strip_marker(line: &str) -> &str {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix(['-', '*', '+', '•']) {
        return rest.trim_start();
    }
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(['.', ')']) {
            return rest.trim_start();
        }
    }
    line
}
