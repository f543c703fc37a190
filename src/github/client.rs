//! GitHub REST client.
//!
//! One pooled `reqwest::Client` per process; every call goes through the
//! configured [`RetryPolicy`].

use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::retry::RetryPolicy;
use super::types::{
    binary_kind, is_likely_binary, BinaryFileInfo, BinaryKind, CommitInfo, CommitPayload,
    ContentEntry, FileContent, FilePayload, FlatEntry, TreeResponse,
};
use super::RepoGateway;
use crate::config::GitHubConfig;
use crate::error::{GatewayError, GatewayResult};

/// Branch used when the repository metadata cannot tell us the default one.
const FALLBACK_BRANCH: &str = "main";

/// GitHub gateway backed by the REST API.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: Url,
    retry: RetryPolicy,
}

impl GitHubClient {
    /// Build a client from configuration.
    pub fn new(config: &GitHubConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&config.user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static("2022-11-28"));

        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let api_base = Url::parse(&config.api_base)
            .map_err(|e| anyhow::anyhow!("Invalid GitHub API URL {}: {e}", config.api_base))?;

        Ok(Self {
            client,
            api_base,
            retry: config.retry.clone(),
        })
    }

    /// Build an endpoint URL from path segments. Each segment is percent-encoded.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> GatewayResult<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Decode(format!("API base {} cannot take a path", self.api_base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn repo_endpoint(&self, owner: &str, repo: &str, rest: &[&str]) -> GatewayResult<Url> {
        self.endpoint(["repos", owner, repo].into_iter().chain(rest.iter().copied()))
    }

    fn contents_endpoint(&self, owner: &str, repo: &str, path: &str) -> GatewayResult<Url> {
        let mut rest = vec!["contents"];
        rest.extend(path.split('/').filter(|s| !s.is_empty()));
        self.repo_endpoint(owner, repo, &rest)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> GatewayResult<T> {
        self.retry.run(what, || self.get_once(url.clone(), what)).await
    }

    async fn get_once<T: DeserializeOwned>(&self, url: Url, what: &str) -> GatewayResult<T> {
        tracing::debug!(%url, "GitHub request");
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| GatewayError::Decode(format!("{what}: {e}")));
        }

        let headers = response.headers().clone();
        let quota_exhausted = headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim() == "0");

        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound {
                resource: what.to_string(),
            });
        }
        if status == StatusCode::TOO_MANY_REQUESTS
            || (status == StatusCode::FORBIDDEN && quota_exhausted)
        {
            let retry_after_ms = headers
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(|secs| secs.saturating_mul(1000));
            return Err(GatewayError::RateLimited { retry_after_ms });
        }

        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn default_branch(&self, owner: &str, repo: &str) -> GatewayResult<String> {
        let info = self.repository_info(owner, repo).await?;
        Ok(info
            .get("default_branch")
            .and_then(|b| b.as_str())
            .unwrap_or(FALLBACK_BRANCH)
            .to_string())
    }
}

/// Decode a `contents` payload into text or binary metadata.
fn decode_file(path: &str, payload: FilePayload) -> GatewayResult<FileContent> {
    let binary_info = |kind: BinaryKind, payload: &FilePayload| BinaryFileInfo {
        is_binary: true,
        name: payload.name.clone(),
        size: payload.size,
        download_url: payload.download_url.clone().unwrap_or_default(),
        kind,
        encoding: payload.encoding.clone().unwrap_or_default(),
    };

    if is_likely_binary(path) {
        return Ok(FileContent::Binary(binary_info(binary_kind(path), &payload)));
    }

    let Some(encoded) = payload.content.as_deref() else {
        return Err(GatewayError::Decode(format!("{path}: no inline content")));
    };

    // GitHub wraps base64 at 60 columns
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let decoded = match base64::engine::general_purpose::STANDARD.decode(compact) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(path, error = %e, "Content is not valid base64, treating as binary");
            return Ok(FileContent::Binary(binary_info(BinaryKind::Binary, &payload)));
        }
    };

    match String::from_utf8(decoded) {
        Ok(text) => Ok(FileContent::Text(text)),
        Err(_) => Ok(FileContent::Binary(binary_info(BinaryKind::Binary, &payload))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ContentsListing {
    Many(Vec<ContentEntry>),
    One(ContentEntry),
}

#[async_trait]
impl RepoGateway for GitHubClient {
    async fn repository_info(&self, owner: &str, repo: &str) -> GatewayResult<serde_json::Value> {
        let url = self.repo_endpoint(owner, repo, &[])?;
        self.get_json(url, &format!("repository {owner}/{repo}")).await
    }

    async fn list_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> GatewayResult<Vec<ContentEntry>> {
        let url = self.contents_endpoint(owner, repo, path)?;
        let listing: ContentsListing = self
            .get_json(url, &format!("contents {owner}/{repo}/{path}"))
            .await?;
        Ok(match listing {
            ContentsListing::Many(entries) => entries,
            ContentsListing::One(entry) => vec![entry],
        })
    }

    async fn flat_tree(&self, owner: &str, repo: &str) -> GatewayResult<Vec<FlatEntry>> {
        let branch = match self.default_branch(owner, repo).await {
            Ok(branch) => branch,
            Err(e) if e.is_not_found() => return Err(e),
            Err(e) => {
                tracing::warn!(owner, repo, fallback = FALLBACK_BRANCH, error = %e, "Could not resolve default branch");
                FALLBACK_BRANCH.to_string()
            }
        };

        let mut url = self.repo_endpoint(owner, repo, &["git", "trees", branch.as_str()])?;
        url.query_pairs_mut().append_pair("recursive", "1");

        let response: TreeResponse = self
            .get_json(url, &format!("tree {owner}/{repo}@{branch}"))
            .await?;
        if response.truncated {
            tracing::warn!(owner, repo, entries = response.tree.len(), "GitHub truncated the tree listing");
        }
        Ok(response.tree)
    }

    async fn read_file(&self, owner: &str, repo: &str, path: &str) -> GatewayResult<FileContent> {
        let url = self.contents_endpoint(owner, repo, path)?;
        let payload: FilePayload = self
            .get_json(url, &format!("file {owner}/{repo}/{path}"))
            .await?;
        decode_file(path, payload)
    }

    async fn list_commits(&self, owner: &str, repo: &str) -> GatewayResult<Vec<CommitInfo>> {
        let url = self.repo_endpoint(owner, repo, &["commits"])?;
        let commits: Vec<CommitPayload> = self
            .get_json(url, &format!("commits {owner}/{repo}"))
            .await?;
        Ok(commits.into_iter().map(CommitInfo::from).collect())
    }
}
