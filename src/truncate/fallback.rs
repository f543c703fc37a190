//! Generic text: the first and last halves of the budget around a marker.

use super::truncation_marker;

pub(super) fn condense(text: &str, total_chars: usize, max_chars: usize) -> String {
    let half = max_chars / 2;
    let head: String = text.chars().take(half).collect();
    let tail: String = text.chars().skip(total_chars.saturating_sub(half)).collect();

    let mut out = String::with_capacity(head.len() + tail.len() + 64);
    out.push_str(&head);
    out.push_str(&truncation_marker(total_chars));
    out.push_str(&tail);
    out
}
