//! Structured data: opening lines, and for JSON the set of keys.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use super::{head_excerpt, push_section, truncation_marker};

const MIN_HEAD_LINES: usize = 15;
const MAX_KEYS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Yaml,
    Xml,
}

impl DataFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }
}

/// A quoted string directly followed by a colon.
fn key_pattern() -> &'static Regex {
    static KEY: OnceLock<Regex> = OnceLock::new();
    KEY.get_or_init(|| Regex::new(r#""((?:[^"\\]|\\.)*)"\s*:"#).expect("static key pattern"))
}

/// Candidate JSON keys anywhere in `text`, de-duplicated and sorted.
///
/// Nested keys are included. The scan does not parse, so it works on
/// documents that are cut off or otherwise invalid.
pub fn json_keys(text: &str) -> Vec<String> {
    key_pattern()
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub(super) fn condense(text: &str, format: DataFormat, total_chars: usize, max_chars: usize) -> String {
    let keep = (max_chars / 200).max(MIN_HEAD_LINES);

    let mut out = head_excerpt(text.lines(), keep, max_chars);
    out.push_str(&truncation_marker(total_chars));

    if format == DataFormat::Json {
        let keys = json_keys(text);
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        push_section(&mut out, "Top-level keys", "keys", &keys, MAX_KEYS);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::super::truncate_content;
    use super::*;

    fn records(n: usize) -> String {
        let body: Vec<String> = (0..n)
            .map(|i| format!("  {{\"id\": {i}, \"name\": \"item-{i}\", \"tags\": [\"a\", \"b\"]}}"))
            .collect();
        format!("[\n{}\n]\n", body.join(",\n"))
    }

    #[test]
    fn test_json_keys_sorted_and_deduplicated() {
        let out = truncate_content(&records(200), "data/items.json", 1_000);
        assert!(out.contains("\nTop-level keys:\nid\nname\ntags\n"));
        assert!(!out.contains("more keys"));
        // "a" and "b" are values, not keys
        assert!(!out.contains("\na\n"));
    }

    #[test]
    fn test_json_key_cap() {
        let fields: Vec<String> = (0..30).map(|i| format!("  \"field_{i:02}\": {i}")).collect();
        let mut doc = format!("{{\n{}\n}}\n", fields.join(",\n"));
        doc.push_str(&" ".repeat(2_000));
        let out = truncate_content(&doc, "wide.json", 500);
        assert!(out.contains("field_19\n"));
        assert!(out.contains("... and 10 more keys"));
    }

    #[test]
    fn test_head_lines_follow_budget() {
        let doc = records(300);
        let out = truncate_content(&doc, "items.json", 4_000);
        // max(15, 4000 / 200) = 20
        let head: Vec<&str> = doc.lines().take(20).collect();
        assert!(out.starts_with(&head.join("\n")));
        assert!(!out.contains("\"item-19\""));
    }

    #[test]
    fn test_yaml_has_no_key_section() {
        let doc: String = (0..200).map(|i| format!("key_{i}: value\n")).collect();
        let out = truncate_content(&doc, "config.yaml", 500);
        assert!(out.starts_with("key_0: value\n"));
        assert!(out.contains("key_14: value"));
        assert!(!out.contains("key_15: value"));
        assert!(!out.contains("Top-level keys"));
    }

    #[test]
    fn test_key_scan_handles_escapes() {
        let keys = json_keys(r#"{"plain": 1, "with \"quote\"": 2, "spaced" : 3, "value"}"#);
        assert_eq!(keys, vec!["plain", "spaced", r#"with \"quote\""#]);
    }

    #[test]
    fn test_format_table() {
        assert_eq!(DataFormat::from_extension("yml"), Some(DataFormat::Yaml));
        assert_eq!(DataFormat::from_extension("xml"), Some(DataFormat::Xml));
        assert_eq!(DataFormat::from_extension("toml"), None);
    }
}
