//! Tree Builder
//!
//! Converts the flat, slash-separated path listing GitHub returns into a
//! nested forest that preserves listing order at every level.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::github::{FlatEntry, RepoGateway};

/// Whether a node is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    #[serde(rename = "dir")]
    Directory,
}

/// A named node in the repository tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    /// Slash-joined path from the repository root
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

/// Incremental forest builder.
///
/// Sibling lookup goes through an index keyed by the node's full path, so
/// building stays linear in the number of path segments even for very wide
/// directories.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    roots: Vec<TreeNode>,
    /// full path -> child positions from the roots down to the node
    index: HashMap<String, Vec<usize>>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one listing entry, creating any missing ancestors.
    ///
    /// The first entry that creates a node decides its kind; later entries
    /// never change it.
    pub fn insert(&mut self, entry: &FlatEntry) {
        let segments: Vec<&str> = entry.path.split('/').filter(|s| !s.is_empty()).collect();
        let Some(last) = segments.len().checked_sub(1) else {
            return;
        };

        let mut position: Vec<usize> = Vec::with_capacity(segments.len());
        let mut path = String::with_capacity(entry.path.len());

        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                path.push('/');
            }
            path.push_str(segment);

            if let Some(existing) = self.index.get(&path) {
                position.clone_from(existing);
                continue;
            }

            let kind = if i == last && entry.kind.is_file() {
                NodeKind::File
            } else {
                NodeKind::Directory
            };

            let siblings = self.children_at(&position);
            siblings.push(TreeNode {
                name: segment.to_string(),
                path: path.clone(),
                kind,
                children: Vec::new(),
            });
            position.push(siblings.len() - 1);
            self.index.insert(path.clone(), position.clone());
        }
    }

    /// The child list of the node at `position` (the roots for an empty position).
    fn children_at(&mut self, position: &[usize]) -> &mut Vec<TreeNode> {
        let mut level = &mut self.roots;
        for &i in position {
            level = &mut level[i].children;
        }
        level
    }

    pub fn finish(self) -> Vec<TreeNode> {
        self.roots
    }
}

/// Build a forest from a flat listing, processed in listing order.
pub fn build_tree(entries: &[FlatEntry]) -> Vec<TreeNode> {
    let mut builder = TreeBuilder::new();
    for entry in entries {
        builder.insert(entry);
    }
    builder.finish()
}

/// Fetch the flat listing and build the forest.
///
/// Gateway failures produce an empty forest; the formatter copes with that.
#[tracing::instrument(skip(gateway))]
pub async fn fetch_tree(gateway: &dyn RepoGateway, owner: &str, repo: &str) -> Vec<TreeNode> {
    match gateway.flat_tree(owner, repo).await {
        Ok(entries) => {
            tracing::debug!(entries = entries.len(), "Building repository tree");
            build_tree(&entries)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Tree listing unavailable, continuing with an empty tree");
            Vec::new()
        }
    }
}

/// Depth-first list of every node path.
pub fn flatten(roots: &[TreeNode]) -> Vec<String> {
    fn walk(nodes: &[TreeNode], out: &mut Vec<String>) {
        for node in nodes {
            out.push(node.path.clone());
            walk(&node.children, out);
        }
    }

    let mut out = Vec::new();
    walk(roots, &mut out);
    out
}

/// Depth-first list of file paths only.
pub fn file_paths(roots: &[TreeNode]) -> Vec<String> {
    fn walk(nodes: &[TreeNode], out: &mut Vec<String>) {
        for node in nodes {
            if node.is_file() {
                out.push(node.path.clone());
            }
            walk(&node.children, out);
        }
    }

    let mut out = Vec::new();
    walk(roots, &mut out);
    out
}
