//! Markdown: opening lines, then the document outline.

use super::{head_excerpt, push_section, truncation_marker};

/// Minimum number of opening lines kept.
const MIN_HEAD_LINES: usize = 10;
/// Headers listed after the excerpt.
const MAX_HEADERS: usize = 20;

pub(super) fn condense(text: &str, total_chars: usize, max_chars: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let keep = (max_chars / 200).max(MIN_HEAD_LINES);

    let mut out = head_excerpt(lines.iter().copied(), keep, max_chars);
    out.push_str(&truncation_marker(total_chars));

    let headers: Vec<&str> = lines.iter().copied().filter(|l| l.starts_with('#')).collect();
    push_section(&mut out, "Document headers", "headers", &headers, MAX_HEADERS);

    out
}
