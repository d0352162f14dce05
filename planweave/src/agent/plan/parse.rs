//! Turns model text into subtask lines.

/// One subtask per non-blank line, trimmed, order kept.
///
/// Never fails: text without line breaks is a single subtask, blank text is none.
pub fn parse_subtask_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
