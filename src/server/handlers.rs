//! Route handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::chat::FileContext;
use crate::context::{format_repo_context_with, FormatOptions};
use crate::error::GatewayError;
use crate::metrics;
use crate::summary::extract_repo_summary;
use crate::tree::fetch_tree;

type RepoPath = Path<(String, String)>;

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn gateway_error(e: GatewayError) -> Response {
    match e {
        GatewayError::NotFound { resource } => {
            error_response(StatusCode::NOT_FOUND, format!("{resource} not found"))
        }
        other => {
            tracing::warn!(error = %other, "GitHub request failed");
            error_response(StatusCode::BAD_GATEWAY, other.to_string())
        }
    }
}

pub async fn repo_info(State(state): State<AppState>, Path((owner, repo)): RepoPath) -> Response {
    match state.gateway.repository_info(&owner, &repo).await {
        Ok(info) => Json(info).into_response(),
        Err(GatewayError::NotFound { .. }) => {
            error_response(StatusCode::NOT_FOUND, "Repository not found")
        }
        Err(e) => gateway_error(e),
    }
}

pub async fn tree(State(state): State<AppState>, Path((owner, repo)): RepoPath) -> Response {
    Json(fetch_tree(state.gateway.as_ref(), &owner, &repo).await).into_response()
}

pub async fn contents(
    State(state): State<AppState>,
    Path((owner, repo, path)): Path<(String, String, String)>,
) -> Response {
    let path = path.trim_start_matches('/');
    match state.gateway.read_file(&owner, &repo, path).await {
        Ok(content) => Json(json!({ "content": content })).into_response(),
        Err(e) => gateway_error(e),
    }
}

async fn list(state: &AppState, owner: &str, repo: &str, path: &str) -> Response {
    let entries = state
        .gateway
        .list_contents(owner, repo, path)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(path, error = %e, "Directory listing unavailable");
            Vec::new()
        });
    Json(entries).into_response()
}

pub async fn list_root(State(state): State<AppState>, Path((owner, repo)): RepoPath) -> Response {
    list(&state, &owner, &repo, "").await
}

pub async fn list_dir(
    State(state): State<AppState>,
    Path((owner, repo, path)): Path<(String, String, String)>,
) -> Response {
    list(&state, &owner, &repo, path.trim_start_matches('/')).await
}

pub async fn context(State(state): State<AppState>, Path((owner, repo)): RepoPath) -> Response {
    let catalog = state.context.key_file_catalog();
    let summary = extract_repo_summary(state.gateway.as_ref(), &owner, &repo, &catalog).await;
    let context = format_repo_context_with(&summary, FormatOptions::from(&state.context));

    Json(json!({
        "context": context,
        "summary": {
            "topLevelDirs": summary.top_level_dirs,
            "languages": summary.languages,
            "keyFiles": summary.key_files,
        }
    }))
    .into_response()
}

pub async fn analyze(State(state): State<AppState>, Path((owner, repo)): RepoPath) -> Response {
    let gateway = state.gateway.as_ref();
    let complexity = metrics::analyze_complexity(gateway, &owner, &repo).await;
    let dependencies = metrics::get_dependencies(gateway, &owner, &repo).await;
    Json(json!({
        "complexity": complexity,
        "dependencies": dependencies,
    }))
    .into_response()
}

pub async fn history(State(state): State<AppState>, Path((owner, repo)): RepoPath) -> Response {
    Json(metrics::commit_history(state.gateway.as_ref(), &owner, &repo).await).into_response()
}

#[derive(Debug, Deserialize, Default)]
pub struct FilePayload {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub query: String,
    #[serde(default)]
    pub context: FilePayload,
    pub repo_owner: Option<String>,
    pub repo_name: Option<String>,
}

pub async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    if request.query.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No query provided");
    }

    let repo_context = match (&request.repo_owner, &request.repo_name) {
        (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
            let catalog = state.context.key_file_catalog();
            let summary = extract_repo_summary(state.gateway.as_ref(), owner, repo, &catalog).await;
            Some(format_repo_context_with(&summary, FormatOptions::from(&state.context)))
        }
        _ => None,
    };

    let file = FileContext {
        path: request.context.path,
        content: request.context.content,
    };
    let text = state.chat.chat(&request.query, &file, repo_context.as_deref()).await;
    Json(json!({ "text": text })).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    pub code: String,
    #[serde(default)]
    pub path: String,
}

pub async fn explain(State(state): State<AppState>, Json(request): Json<ExplainRequest>) -> Response {
    if request.code.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No code provided");
    }
    let text = state.chat.explain_code(&request.code, &request.path).await;
    Json(json!({ "text": text })).into_response()
}

#[cfg(test)]
mod tests {
    use super::super::{router, AppState};
    use crate::chat::ChatOrchestrator;
    use crate::config::ContextConfig;
    use crate::github::fake::FakeGateway;
    use crate::llm::{CompletionResponse, LLMProvider, Message};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Arc;

    /// Echoes the user prompt back so tests can inspect it.
    struct EchoProvider;

    #[async_trait]
    impl LLMProvider for EchoProvider {
        fn model(&self) -> &str {
            "echo"
        }

        async fn completion(&self, messages: &[Message]) -> anyhow::Result<CompletionResponse> {
            Ok(CompletionResponse {
                content: messages.last().map(|m| m.content.clone()).unwrap_or_default(),
                usage: None,
            })
        }
    }

    fn demo_repo() -> FakeGateway {
        FakeGateway::new()
            .with_text("README.md", "# Demo project\n")
            .with_text("src/main.py", "def main():\n    if True:\n        pass\n")
            .with_text("src/utils/helpers.py", "def helper(a, b):\n    return a\n")
            .with_text("requirements.txt", "flask\n")
    }

    /// Serve the router on an ephemeral port and return its base URL.
    async fn spawn(gateway: FakeGateway) -> String {
        let chat = ChatOrchestrator::new(Arc::new(EchoProvider), ContextConfig::default());
        let state = AppState::new(Arc::new(gateway), chat, ContextConfig::default());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn get_json(url: String) -> (u16, Value) {
        let response = reqwest::get(url).await.unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let base = spawn(FakeGateway::new()).await;
        let body = reqwest::get(format!("{base}/health")).await.unwrap().text().await.unwrap();
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_context_route() {
        let base = spawn(demo_repo()).await;
        let (status, body) = get_json(format!("{base}/repo/octo/demo/context")).await;

        assert_eq!(status, 200);
        let context = body["context"].as_str().unwrap();
        assert!(context.starts_with("Repository Overview:\n"));
        assert!(context.contains("- src/\n"));
        assert!(context.contains("README Summary:\n# Demo project"));
        assert_eq!(body["summary"]["topLevelDirs"], json!(["src"]));
        assert_eq!(body["summary"]["languages"]["py"], 2);
        assert_eq!(body["summary"]["keyFiles"], json!(["requirements.txt", "src/main.py"]));
    }

    #[tokio::test]
    async fn test_contents_and_not_found() {
        let base = spawn(demo_repo()).await;

        let (status, body) = get_json(format!("{base}/repo/octo/demo/contents/src/utils/helpers.py")).await;
        assert_eq!(status, 200);
        assert!(body["content"].as_str().unwrap().starts_with("def helper"));

        let (status, body) = get_json(format!("{base}/repo/octo/demo/contents/missing.rs")).await;
        assert_eq!(status, 404);
        assert!(body["error"].as_str().unwrap().contains("missing.rs"));
    }

    #[tokio::test]
    async fn test_tree_and_listing() {
        let base = spawn(demo_repo()).await;

        let (_, tree) = get_json(format!("{base}/repo/octo/demo/tree")).await;
        let names: Vec<&str> = tree.as_array().unwrap().iter().map(|n| n["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["README.md", "requirements.txt", "src"]);
        assert_eq!(tree[2]["type"], "dir");

        let (_, root) = get_json(format!("{base}/repo/octo/demo/list")).await;
        assert_eq!(root.as_array().unwrap().len(), 3);

        let (_, src) = get_json(format!("{base}/repo/octo/demo/list/src")).await;
        let entries: Vec<(&str, &str)> = src
            .as_array()
            .unwrap()
            .iter()
            .map(|e| (e["name"].as_str().unwrap(), e["type"].as_str().unwrap()))
            .collect();
        assert_eq!(entries, vec![("main.py", "file"), ("utils", "dir")]);
    }

    #[tokio::test]
    async fn test_analyze_and_history() {
        let base = spawn(demo_repo()).await;

        let (status, body) = get_json(format!("{base}/repo/octo/demo/analyze")).await;
        assert_eq!(status, 200);
        assert_eq!(body["complexity"]["src/main.py"]["cyclomatic_complexity"], 3);
        assert_eq!(body["complexity"]["src/utils/helpers.py"]["functions"][0]["name"], "helper");
        assert_eq!(body["dependencies"]["python"], json!(["flask"]));

        let (status, body) = get_json(format!("{base}/repo/octo/demo/history")).await;
        assert_eq!(status, 200);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_repo_info_offline_is_bad_gateway() {
        let base = spawn(FakeGateway::offline()).await;
        let (status, _) = get_json(format!("{base}/repo/octo/demo")).await;
        assert_eq!(status, 502);

        let base = spawn(demo_repo()).await;
        let (status, body) = get_json(format!("{base}/repo/octo/demo")).await;
        assert_eq!(status, 200);
        assert_eq!(body["full_name"], "octo/demo");
    }

    #[tokio::test]
    async fn test_chat_with_repo_context() {
        let base = spawn(demo_repo()).await;
        let client = reqwest::Client::new();

        let body: Value = client
            .post(format!("{base}/repo/chat"))
            .json(&json!({
                "query": "What does helper return?",
                "context": {"content": "def helper(a, b):\n    return a\n", "path": "src/utils/helpers.py"},
                "repoOwner": "octo",
                "repoName": "demo"
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let text = body["text"].as_str().unwrap();
        assert!(text.starts_with("Repository context:\nRepository Overview:\n"));
        assert!(text.contains("I'm looking at the file src/utils/helpers.py"));
        assert!(text.ends_with("Question: What does helper return?\n"));
    }

    #[tokio::test]
    async fn test_chat_and_explain_validation() {
        let base = spawn(FakeGateway::new()).await;
        let client = reqwest::Client::new();

        let status = client
            .post(format!("{base}/repo/chat"))
            .json(&json!({"query": "  "}))
            .send()
            .await
            .unwrap()
            .status();
        assert_eq!(status.as_u16(), 400);

        let body: Value = client
            .post(format!("{base}/repo/explain"))
            .json(&json!({"code": "print(1)", "path": "a.py"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(body["text"].as_str().unwrap().starts_with("Analyze this code from a.py"));
    }
}
