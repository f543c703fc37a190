//! Structure Analyzer
//!
//! Walks the repository forest once and collects extension counts, key
//! configuration files and top-level directory names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::tree::TreeNode;

/// File names recognised as structurally significant.
pub const DEFAULT_KEY_FILES: &[&str] = &[
    // Dependency manifests
    "requirements.txt",
    "setup.py",
    "package.json",
    // Containers
    "dockerfile",
    "docker-compose.yml",
    // Environment templates
    ".env.example",
    // Entry points
    "main.py",
    "app.py",
    "index.py",
    "run.py",
];

/// Which files count as key files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFileCatalog {
    /// Lower-case file names matched anywhere in the tree
    names: Vec<String>,
    /// Exact repository paths matched as-is
    paths: Vec<String>,
}

impl KeyFileCatalog {
    pub fn new<N, P>(names: N, paths: P) -> Self
    where
        N: IntoIterator,
        N::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            names: names.into_iter().map(|n| n.as_ref().to_lowercase()).collect(),
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Add an exact-path heuristic, e.g. a project-specific entry point.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }

    pub fn matches(&self, name: &str, path: &str) -> bool {
        let lower = name.to_lowercase();
        self.names.iter().any(|n| *n == lower) || self.paths.iter().any(|p| p == path)
    }
}

impl Default for KeyFileCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_FILES.iter(), Vec::<String>::new())
    }
}

/// Result of a structure walk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureStats {
    /// Lower-case extension -> file count
    pub languages: BTreeMap<String, usize>,
    /// Key file paths in traversal order
    pub key_files: Vec<String>,
    /// Directory names at depth 0, in listing order
    pub top_level_dirs: Vec<String>,
}

/// Extension used for language statistics: text after the last `.`, lower-cased.
pub fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

/// Analyze the forest depth-first.
pub fn analyze_structure(roots: &[TreeNode], catalog: &KeyFileCatalog) -> StructureStats {
    let mut stats = StructureStats::default();
    visit(roots, "", catalog, &mut stats);
    stats
}

fn visit(nodes: &[TreeNode], parent: &str, catalog: &KeyFileCatalog, stats: &mut StructureStats) {
    for node in nodes {
        let current = if parent.is_empty() {
            node.name.clone()
        } else {
            format!("{}/{}", parent, node.name)
        };

        if parent.is_empty() && node.is_dir() {
            stats.top_level_dirs.push(node.name.clone());
        }

        if node.is_file() {
            if let Some(ext) = extension_of(&node.name) {
                *stats.languages.entry(ext).or_insert(0) += 1;
            }
            if catalog.matches(&node.name, &current) {
                stats.key_files.push(current.clone());
            }
        }

        visit(&node.children, &current, catalog, stats);
    }
}
