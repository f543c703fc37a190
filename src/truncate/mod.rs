//! Content Truncator
//!
//! Condenses oversized file text into a representation that keeps the parts
//! an LLM gets the most out of for that kind of file:
//!
//! - Markdown: opening lines plus the header outline
//! - Source code: opening lines, imports and declarations
//! - Structured data: opening lines plus (for JSON) the key set
//! - Line-oriented data: counts plus head/middle/tail samples
//! - Anything else: head and tail halves
//!
//! Outputs can run slightly over the budget because of section labels.
//! They are never clipped to an exact length.

mod dictionary;
mod fallback;
mod markdown;
mod source;
mod structured;

pub use source::Language;
pub use structured::DataFormat;

/// Default character budget for a single file.
pub const DEFAULT_MAX_CHARS: usize = 10_000;

/// Characters inspected by the binary heuristic.
const BINARY_SAMPLE_CHARS: usize = 1_000;

/// Lines in each dictionary sample.
pub const DEFAULT_SAMPLE_LINES: usize = 10;

/// Longest single line copied into a section list.
pub(crate) const MAX_EXCERPT_LINE: usize = 500;

/// Condensation strategy, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Markdown,
    Source(Language),
    Structured(DataFormat),
    Dictionary,
    Generic,
}

impl FileCategory {
    pub fn from_path(path: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path);
        let Some((_, ext)) = name.rsplit_once('.') else {
            return Self::Generic;
        };
        let ext = ext.to_lowercase();

        match ext.as_str() {
            "md" | "markdown" | "mdx" | "rst" => Self::Markdown,
            "txt" | "csv" | "tsv" | "vocab" | "dic" | "dict" | "lst" => Self::Dictionary,
            _ => {
                if let Some(format) = DataFormat::from_extension(&ext) {
                    Self::Structured(format)
                } else if let Some(lang) = Language::from_extension(&ext) {
                    Self::Source(lang)
                } else {
                    Self::Generic
                }
            }
        }
    }
}

/// Condense `text` to roughly `max_chars` characters.
///
/// Text at or under the budget is returned unchanged. Lengths are counted in
/// characters, not bytes.
pub fn truncate_content(text: &str, path: &str, max_chars: usize) -> String {
    let total_chars = text.chars().count();
    if total_chars <= max_chars {
        return text.to_string();
    }

    if looks_binary(text) {
        return format!("[Binary file, {} bytes]", text.len());
    }

    match FileCategory::from_path(path) {
        FileCategory::Markdown => markdown::condense(text, total_chars, max_chars),
        FileCategory::Source(lang) => source::condense(text, lang, total_chars, max_chars),
        FileCategory::Structured(format) => structured::condense(text, format, total_chars, max_chars),
        FileCategory::Dictionary => dictionary::condense(text, DEFAULT_SAMPLE_LINES),
        FileCategory::Generic => fallback::condense(text, total_chars, max_chars),
    }
}

/// More than 10% control characters (other than `\n`, `\r`, `\t`) in the
/// first 1000 characters marks the text as binary.
pub fn looks_binary(text: &str) -> bool {
    let mut sampled = 0usize;
    let mut control = 0usize;
    for c in text.chars().take(BINARY_SAMPLE_CHARS) {
        sampled += 1;
        if (c as u32) < 32 && !matches!(c, '\n' | '\r' | '\t') {
            control += 1;
        }
    }
    // control / sampled > 0.1
    sampled > 0 && control * 10 > sampled
}

/// Marker placed between an excerpt and the sections that follow it.
pub(crate) fn truncation_marker(total_chars: usize) -> String {
    format!("\n\n... [truncated: original length {total_chars} characters] ...\n")
}

/// The first `keep` lines, verbatim.
///
/// Only the line that would take the excerpt past `max_chars` is shortened,
/// and nothing follows it. A single minified line stays bounded; ordinary
/// long paragraphs are kept whole.
pub(crate) fn head_excerpt<'a>(lines: impl IntoIterator<Item = &'a str>, keep: usize, max_chars: usize) -> String {
    let mut out = String::new();
    let mut used = 0usize;
    for (i, line) in lines.into_iter().take(keep).enumerate() {
        let sep = usize::from(i > 0);
        let len = line.chars().count();
        if used + sep + len <= max_chars {
            if sep == 1 {
                out.push('\n');
            }
            out.push_str(line);
            used += sep + len;
            continue;
        }
        let room = max_chars.saturating_sub(used + sep);
        if room > 0 {
            if sep == 1 {
                out.push('\n');
            }
            out.extend(line.chars().take(room));
            out.push_str(" ...");
        }
        break;
    }
    out
}

/// A line as it goes into a section list; very long lines are shortened.
pub(crate) fn excerpt_line(line: &str) -> String {
    match line.char_indices().nth(MAX_EXCERPT_LINE) {
        Some((cut, _)) => format!("{} ...", &line[..cut]),
        None => line.to_string(),
    }
}

/// Append a labelled list, reporting how many items were left out.
pub(crate) fn push_section(out: &mut String, label: &str, noun: &str, items: &[&str], limit: usize) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("\n{label}:\n"));
    for item in items.iter().take(limit) {
        out.push_str(&excerpt_line(item));
        out.push('\n');
    }
    if items.len() > limit {
        out.push_str(&format!("... and {} more {noun}\n", items.len() - limit));
    }
}
