//! Context Formatter
//!
//! Renders a [`RepoSummary`] as prompt-ready text. Section order is fixed:
//! directories, languages, key files, tree, README.

use std::fmt::Write;

use crate::config::ContextConfig;
use crate::summary::RepoSummary;
use crate::tree::TreeNode;

const FILE_GLYPH: &str = "📄";
const DIR_GLYPH: &str = "📁";
const README_SUFFIX: &str = "... (truncated)";

/// Limits applied while formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Characters of README kept
    pub readme_chars: usize,
    /// Deepest level whose children are still rendered (roots are level 0)
    pub tree_depth: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            readme_chars: 2_000,
            tree_depth: 3,
        }
    }
}

impl From<&ContextConfig> for FormatOptions {
    fn from(config: &ContextConfig) -> Self {
        Self {
            readme_chars: config.readme_chars,
            tree_depth: config.tree_depth,
        }
    }
}

/// Format with the default limits.
pub fn format_repo_context(summary: &RepoSummary) -> String {
    format_repo_context_with(summary, FormatOptions::default())
}

pub fn format_repo_context_with(summary: &RepoSummary, options: FormatOptions) -> String {
    let mut out = String::from("Repository Overview:\n");

    if !summary.top_level_dirs.is_empty() {
        let mut dirs: Vec<&String> = summary.top_level_dirs.iter().collect();
        dirs.sort();
        out.push_str("\nTop-level Directories:\n");
        for dir in dirs {
            let _ = writeln!(out, "- {dir}/");
        }
    }

    if !summary.languages.is_empty() {
        let mut languages: Vec<(&String, &usize)> = summary.languages.iter().collect();
        // Count descending; the map's key order breaks ties
        languages.sort_by(|a, b| b.1.cmp(a.1));
        out.push_str("\nLanguages:\n");
        for (ext, count) in languages {
            let _ = writeln!(out, "- {ext}: {count} files");
        }
    }

    if !summary.key_files.is_empty() {
        out.push_str("\nKey Files:\n");
        for file in &summary.key_files {
            let _ = writeln!(out, "- {file}");
        }
    }

    out.push_str("\nRepository Structure:\n");
    render_tree(&mut out, &summary.tree, 0, options.tree_depth);

    if !summary.readme.is_empty() {
        out.push_str("\nREADME Summary:\n");
        out.push_str(&readme_excerpt(&summary.readme, options.readme_chars));
    }

    out
}

/// The first `limit` characters, with a suffix when anything was cut.
pub fn readme_excerpt(readme: &str, limit: usize) -> String {
    match readme.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{README_SUFFIX}", &readme[..cut]),
        None => readme.to_string(),
    }
}

fn render_tree(out: &mut String, nodes: &[TreeNode], depth: usize, max_depth: usize) {
    for node in nodes {
        let glyph = if node.is_file() { FILE_GLYPH } else { DIR_GLYPH };
        let _ = writeln!(out, "{}{} {}", "  ".repeat(depth), glyph, node.name);
        if !node.children.is_empty() && depth < max_depth {
            render_tree(out, &node.children, depth + 1, max_depth);
        }
    }
}
