//! HTTP surface
//!
//! A thin `axum` layer over the gateway, the extraction pipeline and the
//! chat orchestrator. All state is read-only and shared through [`AppState`].

pub mod handlers;
pub mod state;

pub use state::AppState;

use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

/// All routes, with permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/repo/chat", post(handlers::chat))
        .route("/repo/explain", post(handlers::explain))
        .route("/repo/:owner/:repo", get(handlers::repo_info))
        .route("/repo/:owner/:repo/tree", get(handlers::tree))
        .route("/repo/:owner/:repo/context", get(handlers::context))
        .route("/repo/:owner/:repo/contents/*path", get(handlers::contents))
        .route("/repo/:owner/:repo/list", get(handlers::list_root))
        .route("/repo/:owner/:repo/list/*path", get(handlers::list_dir))
        .route("/repo/:owner/:repo/analyze", get(handlers::analyze))
        .route("/repo/:owner/:repo/history", get(handlers::history))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `0.0.0.0:{port}` and serve until the process exits.
pub async fn run_server(state: AppState, port: u16) -> Result<()> {
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await {
        Ok(l) => l,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            anyhow::bail!("Port {} is already in use. Try `gitsage serve --port <PORT>`.", port);
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(port, "GitSage server listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
