//! GitSage: ask questions about a GitHub repository.
//!
//! The library turns a repository (tree listing, README, the file a user has
//! open) into a bounded, information-dense prompt and hands it to an
//! OpenAI-compatible chat model.
//!
//! Pipeline: [`github`] -> [`tree`] -> [`analyzer`] -> [`context`] -> [`chat`].
//! [`truncate`] condenses any single file that is too large to send whole.

pub mod analyzer;
pub mod chat;
pub mod config;
pub mod context;
pub mod error;
pub mod github;
pub mod llm;
pub mod metrics;
pub mod server;
pub mod summary;
pub mod tree;
pub mod truncate;

pub use analyzer::{analyze_structure, KeyFileCatalog, StructureStats};
pub use chat::{ChatOrchestrator, FileContext};
pub use config::Config;
pub use context::{format_repo_context, format_repo_context_with, FormatOptions};
pub use error::{GatewayError, GatewayResult};
pub use github::{parse_repo_spec, FileContent, GitHubClient, RepoGateway};
pub use llm::{LLMProvider, OpenAIProvider};
pub use summary::{extract_repo_summary, RepoSummary};
pub use tree::{build_tree, TreeNode};
pub use truncate::{truncate_content, DEFAULT_MAX_CHARS};

/// Install the global `tracing` subscriber writing compact lines to stderr.
///
/// `RUST_LOG` wins over `level` when set. Calling this twice is harmless.
pub fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
