//! GitHub Content Gateway
//!
//! The rest of the crate talks to GitHub only through [`RepoGateway`], so the
//! extraction pipeline can be driven by the HTTP client or an in-memory fake.

pub mod client;
#[cfg(test)]
pub(crate) mod fake;
pub mod retry;
pub mod types;

pub use client::GitHubClient;
pub use retry::RetryPolicy;
pub use types::{
    binary_kind, is_likely_binary, BinaryFileInfo, BinaryKind, CommitInfo, ContentEntry,
    EntryKind, FileContent, FlatEntry,
};

use anyhow::Result;
use async_trait::async_trait;

use crate::error::GatewayResult;

/// Read access to a hosted repository.
#[async_trait]
pub trait RepoGateway: Send + Sync {
    /// Repository metadata as returned by the API.
    async fn repository_info(&self, owner: &str, repo: &str) -> GatewayResult<serde_json::Value>;

    /// One directory level (`""` for the root).
    async fn list_contents(&self, owner: &str, repo: &str, path: &str)
        -> GatewayResult<Vec<ContentEntry>>;

    /// Every path in the repository, in listing order.
    async fn flat_tree(&self, owner: &str, repo: &str) -> GatewayResult<Vec<FlatEntry>>;

    /// A single file, decoded to text when possible.
    async fn read_file(&self, owner: &str, repo: &str, path: &str) -> GatewayResult<FileContent>;

    /// Recent commits, newest first.
    async fn list_commits(&self, owner: &str, repo: &str) -> GatewayResult<Vec<CommitInfo>>;
}

/// Parse `owner/repo` from either "owner/repo" or a GitHub URL like
/// "https://github.com/owner/repo/blob/main/path".
///
/// Returns `(owner, repo, optional_path)`.
pub fn parse_repo_spec(input: &str) -> Result<(String, String, Option<String>)> {
    let input = input.trim().trim_end_matches('/');

    if input.starts_with("http://") || input.starts_with("https://") {
        let url = reqwest::Url::parse(input)
            .map_err(|e| anyhow::anyhow!("Could not parse GitHub URL {input}: {e}"))?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();
        if segments.len() < 2 {
            anyhow::bail!("Could not parse GitHub URL: {input}");
        }
        let owner = segments[0].to_string();
        let repo = segments[1].trim_end_matches(".git").to_string();
        // skip "blob"/"tree" + branch
        let path = (segments.len() > 4).then(|| segments[4..].join("/"));
        return Ok((owner, repo, path));
    }

    match input.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string(), None))
        }
        _ => anyhow::bail!(
            "Invalid repo format '{input}'. Expected 'owner/repo' or a full GitHub URL."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_form() {
        let (owner, repo, path) = parse_repo_spec("rust-lang/cargo").unwrap();
        assert_eq!((owner.as_str(), repo.as_str()), ("rust-lang", "cargo"));
        assert!(path.is_none());
    }

    #[test]
    fn test_parse_url_with_path() {
        let (owner, repo, path) =
            parse_repo_spec("https://github.com/tokio-rs/axum/blob/main/axum/src/lib.rs").unwrap();
        assert_eq!(owner, "tokio-rs");
        assert_eq!(repo, "axum");
        assert_eq!(path.as_deref(), Some("axum/src/lib.rs"));
    }

    #[test]
    fn test_parse_git_suffix() {
        let (_, repo, _) = parse_repo_spec("https://github.com/serde-rs/json.git").unwrap();
        assert_eq!(repo, "json");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_repo_spec("just-a-name").is_err());
        assert!(parse_repo_spec("/repo").is_err());
        assert!(parse_repo_spec("a/b/c").is_err());
    }
}
