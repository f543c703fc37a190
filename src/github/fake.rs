//! In-memory [`RepoGateway`] used by pipeline tests.

use async_trait::async_trait;
use std::collections::BTreeMap;

use super::{CommitInfo, ContentEntry, EntryKind, FileContent, FlatEntry, RepoGateway};
use crate::error::{GatewayError, GatewayResult};

/// A single repository held in memory. With `offline` set every call fails
/// with a server error.
#[derive(Debug, Default, Clone)]
pub struct FakeGateway {
    pub files: BTreeMap<String, FileContent>,
    pub commits: Vec<CommitInfo>,
    pub offline: bool,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, path: &str, text: &str) -> Self {
        self.files.insert(path.to_string(), FileContent::Text(text.to_string()));
        self
    }

    pub fn with_file(mut self, path: &str, content: FileContent) -> Self {
        self.files.insert(path.to_string(), content);
        self
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    fn check(&self) -> GatewayResult<()> {
        if self.offline {
            return Err(GatewayError::Status {
                status: 503,
                body: "offline".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RepoGateway for FakeGateway {
    async fn repository_info(&self, owner: &str, repo: &str) -> GatewayResult<serde_json::Value> {
        self.check()?;
        Ok(serde_json::json!({
            "full_name": format!("{owner}/{repo}"),
            "default_branch": "main",
        }))
    }

    async fn list_contents(
        &self,
        _owner: &str,
        _repo: &str,
        path: &str,
    ) -> GatewayResult<Vec<ContentEntry>> {
        self.check()?;
        let prefix = if path.is_empty() { String::new() } else { format!("{path}/") };
        let mut seen: Vec<ContentEntry> = Vec::new();
        for file in self.files.keys() {
            let Some(rest) = file.strip_prefix(&prefix) else {
                continue;
            };
            let (name, kind) = match rest.split_once('/') {
                Some((dir, _)) => (dir, "dir"),
                None => (rest, "file"),
            };
            if seen.iter().any(|e| e.name == name) {
                continue;
            }
            seen.push(ContentEntry {
                name: name.to_string(),
                path: format!("{prefix}{name}"),
                kind: kind.to_string(),
                size: 0,
            });
        }
        Ok(seen)
    }

    async fn flat_tree(&self, _owner: &str, _repo: &str) -> GatewayResult<Vec<FlatEntry>> {
        self.check()?;
        Ok(self
            .files
            .keys()
            .map(|p| FlatEntry {
                path: p.clone(),
                kind: EntryKind::Blob,
            })
            .collect())
    }

    async fn read_file(&self, _owner: &str, _repo: &str, path: &str) -> GatewayResult<FileContent> {
        self.check()?;
        self.files.get(path).cloned().ok_or_else(|| GatewayError::NotFound {
            resource: path.to_string(),
        })
    }

    async fn list_commits(&self, _owner: &str, _repo: &str) -> GatewayResult<Vec<CommitInfo>> {
        self.check()?;
        Ok(self.commits.clone())
    }
}
