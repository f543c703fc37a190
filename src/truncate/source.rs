//! Source code: opening lines plus the import and declaration skeleton.
//!
//! Detection is line-based and loose. A C line containing `) {` counts as a
//! definition even when it is an `if`.

use super::{head_excerpt, push_section, truncation_marker};

/// Upper bound on opening lines kept.
const MAX_HEAD_LINES: usize = 30;
const MAX_IMPORTS: usize = 20;
const MAX_DEFINITIONS: usize = 30;

/// Languages with dedicated import/definition patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Kotlin,
    CSharp,
    C,
    Cpp,
    Go,
    Rust,
    Php,
    Swift,
    Shell,
}

/// How declaration lines are recognised.
#[derive(Debug, Clone, Copy)]
enum DefinitionRule {
    /// A keyword plus `{` or a `)...:` signature ending
    Keywords(&'static [&'static str]),
    /// C-family heuristic: `){` / `) {`, or an aggregate keyword with `{`
    Brackets,
}

const C_AGGREGATES: &[&str] = &["struct ", "class ", "enum ", "union ", "typedef ", "namespace "];

impl Language {
    pub fn from_extension(ext: &str) -> Option<Self> {
        Some(match ext {
            "py" | "pyw" => Self::Python,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "ts" | "tsx" => Self::TypeScript,
            "java" | "scala" => Self::Java,
            "kt" | "kts" => Self::Kotlin,
            "cs" => Self::CSharp,
            "c" | "h" => Self::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Self::Cpp,
            "go" => Self::Go,
            "rs" => Self::Rust,
            "php" => Self::Php,
            "swift" => Self::Swift,
            "sh" | "bash" | "zsh" => Self::Shell,
            _ => return None,
        })
    }

    fn import_prefixes(self) -> &'static [&'static str] {
        match self {
            Self::Python => &["import ", "from "],
            Self::JavaScript | Self::TypeScript => &["import ", "export * from ", "require("],
            Self::Java | Self::Kotlin => &["import ", "package "],
            Self::CSharp => &["using "],
            Self::C | Self::Cpp => &["#include"],
            Self::Go => &["import ", "package "],
            Self::Rust => &["use ", "pub use ", "extern crate ", "mod ", "pub mod "],
            Self::Php => &["use ", "require", "include", "namespace "],
            Self::Swift => &["import "],
            Self::Shell => &["source ", ". "],
        }
    }

    fn definition_rule(self) -> DefinitionRule {
        use DefinitionRule::{Brackets, Keywords};
        match self {
            Self::Python => Keywords(&["def ", "async def ", "class "]),
            Self::JavaScript => Keywords(&["function", "class ", "const ", "let ", "export "]),
            Self::TypeScript => Keywords(&[
                "function", "class ", "const ", "let ", "export ", "interface ", "type ", "enum ",
            ]),
            Self::Java | Self::Kotlin | Self::CSharp => Keywords(&[
                "class ", "interface ", "enum ", "record ", "fun ", "public ", "private ",
                "protected ", "static ", "internal ",
            ]),
            Self::C | Self::Cpp => Brackets,
            Self::Go => Keywords(&["func ", "type "]),
            Self::Rust => Keywords(&["fn ", "struct ", "enum ", "trait ", "impl", "mod ", "macro_rules!"]),
            Self::Php => Keywords(&["function ", "class ", "interface ", "trait "]),
            Self::Swift => Keywords(&["func ", "class ", "struct ", "enum ", "protocol ", "extension "]),
            Self::Shell => Keywords(&["function "]),
        }
    }

    fn is_import(self, line: &str) -> bool {
        let trimmed = line.trim_start();
        self.import_prefixes().iter().any(|p| trimmed.starts_with(p))
    }

    fn is_definition(self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*') {
            return false;
        }

        match self.definition_rule() {
            DefinitionRule::Keywords(keywords) => {
                keywords.iter().any(|kw| has_keyword(trimmed, kw)) && opens_body(trimmed)
            }
            DefinitionRule::Brackets => {
                trimmed.contains("){")
                    || trimmed.contains(") {")
                    || (C_AGGREGATES.iter().any(|kw| trimmed.starts_with(kw)) && trimmed.contains('{'))
            }
        }
    }
}

/// `kw` at the start of the line or right after a space (`pub fn`, `export default function`).
fn has_keyword(line: &str, kw: &str) -> bool {
    if line.starts_with(kw) {
        return true;
    }
    let bytes = line.as_bytes();
    line.match_indices(kw).any(|(i, _)| i > 0 && bytes[i - 1] == b' ')
}

/// A brace, or a `:` closing a parenthesised signature (`def f(x):`, `def f(x) -> int:`).
fn opens_body(line: &str) -> bool {
    if line.contains('{') {
        return true;
    }
    match line.rfind(')') {
        Some(close) => line.ends_with(':') && close < line.len() - 1,
        None => false,
    }
}

pub(super) fn condense(text: &str, lang: Language, total_chars: usize, max_chars: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let keep = (lines.len() / 10).min(MAX_HEAD_LINES);

    let mut out = head_excerpt(lines.iter().copied(), keep, max_chars);
    out.push_str(&truncation_marker(total_chars));
    out.push_str(&format!("[{} lines in total]\n", lines.len()));

    let imports: Vec<&str> = lines.iter().copied().filter(|l| lang.is_import(l)).map(str::trim).collect();
    let definitions: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|l| lang.is_definition(l))
        .map(str::trim_end)
        .collect();

    push_section(&mut out, "Imports", "imports", &imports, MAX_IMPORTS);
    push_section(&mut out, "Definitions", "definitions", &definitions, MAX_DEFINITIONS);

    out
}
