//! GitHub REST payloads and the shapes handed to the rest of the crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind flag of a flat tree entry (`blob` = file, `tree` = directory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    /// Submodule pointer; treated like a directory without children
    Commit,
}

impl EntryKind {
    pub fn is_file(self) -> bool {
        matches!(self, Self::Blob)
    }
}

/// One entry of the recursive `git/trees` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl FlatEntry {
    pub fn file(path: impl Into<String>) -> Self {
        Self { path: path.into(), kind: EntryKind::Blob }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self { path: path.into(), kind: EntryKind::Tree }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TreeResponse {
    #[serde(default)]
    pub tree: Vec<FlatEntry>,
    #[serde(default)]
    pub truncated: bool,
}

/// One entry of a `contents/{path}` directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub size: u64,
}

/// A single file from `contents/{path}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FilePayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

/// Coarse type of a non-text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryKind {
    Image,
    Audio,
    Video,
    Document,
    Archive,
    Binary,
}

/// Metadata returned instead of content for binary files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryFileInfo {
    pub is_binary: bool,
    pub name: String,
    pub size: u64,
    pub download_url: String,
    #[serde(rename = "type")]
    pub kind: BinaryKind,
    pub encoding: String,
}

/// Decoded file content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileContent {
    Text(String),
    Binary(BinaryFileInfo),
}

impl FileContent {
    /// Text body, if the file decoded as UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }
}

/// Commit summary for the history view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    pub author: String,
    pub date: Option<DateTime<Utc>>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitPayload {
    pub sha: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitDetail {
    #[serde(default)]
    pub author: Option<CommitAuthor>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitAuthor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl From<CommitPayload> for CommitInfo {
    fn from(payload: CommitPayload) -> Self {
        let (author, date) = match payload.commit.author {
            Some(a) => (a.name, a.date),
            None => (String::new(), None),
        };
        Self {
            sha: payload.sha,
            author,
            date,
            message: payload.commit.message,
        }
    }
}

/// Extensions served as metadata without decoding.
const BINARY_EXTENSIONS: &[&str] = &[
    // Images
    "jpg", "jpeg", "png", "gif", "bmp", "ico", "svg", "webp",
    // Audio
    "mp3", "wav", "ogg", "m4a",
    // Video
    "mp4", "avi", "mov", "mkv", "webm",
    // Documents
    "pdf", "doc", "docx", "ppt", "pptx", "xls", "xlsx",
    // Archives
    "zip", "rar", "tar", "gz", "7z",
    // Compiled
    "exe", "dll", "so", "class", "pyc",
    // Other binary
    "bin", "dat", "iso", "img",
    // ML models and data
    "pkl", "model", "onnx", "pb",
];

fn extension(path: &str) -> Option<String> {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

/// Whether a path is likely binary based on its extension.
pub fn is_likely_binary(path: &str) -> bool {
    extension(path).is_some_and(|ext| BINARY_EXTENSIONS.contains(&ext.as_str()))
}

/// Classify a binary path into a coarse kind.
pub fn binary_kind(path: &str) -> BinaryKind {
    match extension(path).as_deref() {
        Some("jpg" | "jpeg" | "png" | "gif" | "bmp" | "svg" | "webp") => BinaryKind::Image,
        Some("mp3" | "wav" | "ogg" | "m4a") => BinaryKind::Audio,
        Some("mp4" | "avi" | "mov" | "mkv" | "webm") => BinaryKind::Video,
        Some("pdf" | "doc" | "docx" | "ppt" | "pptx" | "xls" | "xlsx") => BinaryKind::Document,
        Some("zip" | "rar" | "tar" | "gz" | "7z") => BinaryKind::Archive,
        _ => BinaryKind::Binary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_extensions() {
        assert!(is_likely_binary("assets/logo.PNG"));
        assert!(is_likely_binary("model/weights.onnx"));
        assert!(!is_likely_binary("src/main.rs"));
        assert!(!is_likely_binary("Makefile"));
        // Directory names with dots do not count
        assert!(!is_likely_binary("v1.zip/README"));
    }

    #[test]
    fn test_binary_kind() {
        assert_eq!(binary_kind("a/b.jpeg"), BinaryKind::Image);
        assert_eq!(binary_kind("song.wav"), BinaryKind::Audio);
        assert_eq!(binary_kind("report.xlsx"), BinaryKind::Document);
        assert_eq!(binary_kind("dist.7z"), BinaryKind::Archive);
        // .ico is binary but not in the image group
        assert_eq!(binary_kind("favicon.ico"), BinaryKind::Binary);
    }

    #[test]
    fn test_tree_entry_deserialization() {
        let json = r#"{"tree":[
            {"path":"src","type":"tree","sha":"a"},
            {"path":"src/lib.rs","type":"blob","sha":"b","size":10},
            {"path":"vendor/dep","type":"commit","sha":"c"}
        ],"truncated":false}"#;
        let parsed: TreeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.tree.len(), 3);
        assert_eq!(parsed.tree[1], FlatEntry::file("src/lib.rs"));
        assert_eq!(parsed.tree[2].kind, EntryKind::Commit);
    }

    #[test]
    fn test_commit_conversion() {
        let json = r#"{"sha":"abc","commit":{"author":{"name":"Ada","date":"2024-03-01T12:00:00Z"},"message":"init"}}"#;
        let payload: CommitPayload = serde_json::from_str(json).unwrap();
        let info = CommitInfo::from(payload);
        assert_eq!(info.author, "Ada");
        assert_eq!(info.message, "init");
        assert!(info.date.is_some());
    }
}
