//! GitSage CLI
//!
//! Commands:
//!   serve - Start HTTP server
//!   context - Print the LLM context for a repository
//!   chat - Ask a question about a repository (optionally about one file)
//!   explain - Review a local source file
//!   analyze - Complexity and dependency report
//!   history - Recent commits
//!   truncate - Condense a local file the way prompts see it
//!   config - Show or initialise ~/.gitsage/config.toml

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;

use gitsage::config::Config;
use gitsage::context::{format_repo_context_with, FormatOptions};
use gitsage::github::{parse_repo_spec, GitHubClient, RepoGateway};
use gitsage::llm::OpenAIProvider;
use gitsage::server::{run_server, AppState};
use gitsage::summary::extract_repo_summary;
use gitsage::truncate::truncate_content;
use gitsage::{metrics, ChatOrchestrator, FileContext};

#[derive(Parser)]
#[command(name = "gitsage")]
#[command(about = "Ask natural-language questions about GitHub repositories")]
#[command(version)]
struct Cli {
    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },

    /// Print the prompt context for a repository
    Context {
        /// "owner/repo" or a GitHub URL
        repo: String,

        /// Print the summary as JSON instead of prompt text
        #[arg(long)]
        json: bool,
    },

    /// Ask a question about a repository
    Chat {
        /// "owner/repo" or a GitHub URL (a /blob/ URL selects the file)
        repo: String,

        /// The question
        query: String,

        /// File to discuss, relative to the repository root
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Explain a local source file
    Explain {
        file: PathBuf,
    },

    /// Cyclomatic complexity of Python files and declared dependencies
    Analyze {
        repo: String,
    },

    /// Recent commits
    History {
        repo: String,

        /// Maximum number of commits shown
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Condense a local file as it would appear in a prompt
    Truncate {
        file: PathBuf,

        /// Character budget
        #[arg(short, long, default_value_t = gitsage::DEFAULT_MAX_CHARS)]
        max_chars: usize,
    },

    /// Show the resolved configuration
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    gitsage::init_tracing(&cli.log_level);

    let config = Config::resolve()?;

    match cli.command {
        Commands::Serve { port } => {
            let state = AppState::new(
                Arc::new(GitHubClient::new(&config.github)?),
                chat_orchestrator(&config)?,
                config.context.clone(),
            );
            if config.github.token.is_none() {
                println!("{}", "No GITHUB_TOKEN set; unauthenticated requests are heavily rate limited.".yellow());
            }
            println!("Server running on http://localhost:{}", port);
            println!("\nAPI Endpoints:");
            println!("  GET    /health                              - Health check");
            println!("  GET    /repo/:owner/:repo                   - Repository metadata");
            println!("  GET    /repo/:owner/:repo/tree              - Nested file tree");
            println!("  GET    /repo/:owner/:repo/context           - Prompt context and summary");
            println!("  GET    /repo/:owner/:repo/contents/*path    - File content");
            println!("  GET    /repo/:owner/:repo/list[/*path]      - Directory listing");
            println!("  GET    /repo/:owner/:repo/analyze           - Complexity and dependencies");
            println!("  GET    /repo/:owner/:repo/history           - Commit history");
            println!("  POST   /repo/chat                           - Chat about code");
            println!("  POST   /repo/explain                        - Explain code");
            run_server(state, port).await?;
        }

        Commands::Context { repo, json } => {
            let (owner, name, _) = parse_repo_spec(&repo)?;
            let gateway = GitHubClient::new(&config.github)?;
            let summary = extract_repo_summary(
                &gateway,
                &owner,
                &name,
                &config.context.key_file_catalog(),
            )
            .await;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "{}",
                    format_repo_context_with(&summary, FormatOptions::from(&config.context))
                );
            }
        }

        Commands::Chat { repo, query, file } => {
            let (owner, name, url_path) = parse_repo_spec(&repo)?;
            let gateway = GitHubClient::new(&config.github)?;
            let orchestrator = chat_orchestrator(&config)?;

            let summary = extract_repo_summary(
                &gateway,
                &owner,
                &name,
                &config.context.key_file_catalog(),
            )
            .await;
            let repo_context = format_repo_context_with(&summary, FormatOptions::from(&config.context));

            let file_context = match file.or(url_path) {
                Some(path) => FileContext {
                    content: read_repo_text(&gateway, &owner, &name, &path).await,
                    path,
                },
                None => FileContext::default(),
            };

            println!("{} {}\n", "Thinking about".dimmed(), format!("{owner}/{name}").cyan());
            let answer = orchestrator.chat(&query, &file_context, Some(&repo_context)).await;
            println!("{}", answer);
        }

        Commands::Explain { file } => {
            let code = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let orchestrator = chat_orchestrator(&config)?;
            let answer = orchestrator.explain_code(&code, &file.display().to_string()).await;
            println!("{}", answer);
        }

        Commands::Analyze { repo } => {
            let (owner, name, _) = parse_repo_spec(&repo)?;
            let gateway = GitHubClient::new(&config.github)?;

            let complexity = metrics::analyze_complexity(&gateway, &owner, &name).await;
            let dependencies = metrics::get_dependencies(&gateway, &owner, &name).await;

            if complexity.is_empty() {
                println!("{}", "No Python files found.".yellow());
            } else {
                println!("{}", "Complexity:".green().bold());
                for (path, stats) in &complexity {
                    println!(
                        "  {}  cc={} loc={} functions={}",
                        path.white().bold(),
                        stats.cyclomatic_complexity.to_string().cyan(),
                        stats.lines_of_code,
                        stats.functions.len()
                    );
                }
            }

            println!("\n{}", "Dependencies:".green().bold());
            println!("  {} {}", "python:".dimmed(), dependencies.python.join(", "));
            let js: Vec<&str> = dependencies
                .javascript
                .dependencies
                .keys()
                .chain(dependencies.javascript.dev_dependencies.keys())
                .map(String::as_str)
                .collect();
            println!("  {} {}", "javascript:".dimmed(), js.join(", "));
        }

        Commands::History { repo, limit } => {
            let (owner, name, _) = parse_repo_spec(&repo)?;
            let gateway = GitHubClient::new(&config.github)?;
            let commits = metrics::commit_history(&gateway, &owner, &name).await;

            if commits.is_empty() {
                println!("{}", "No commits found.".yellow());
            }
            for commit in commits.iter().take(limit) {
                let short_sha: String = commit.sha.chars().take(7).collect();
                let date = commit
                    .date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                let subject = commit.message.lines().next().unwrap_or_default();
                println!(
                    "{} {} {} {}",
                    short_sha.yellow(),
                    date.dimmed(),
                    commit.author.cyan(),
                    subject
                );
            }
        }

        Commands::Truncate { file, max_chars } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let path = file.to_string_lossy().replace('\\', "/");
            print!("{}", truncate_content(&text, &path, max_chars));
        }

        Commands::Config { init } => {
            let path = Config::path()?;
            if init {
                if Config::exists() {
                    println!("{} {}", "Config already exists:".yellow(), path.display());
                } else {
                    Config::default().save()?;
                    println!("{} {}", "Wrote".green(), path.display());
                }
            }

            println!("{}", "Configuration:".green().bold());
            println!("  {}  {}", "file".dimmed(), path.display());
            println!("  {}  {}", "github".dimmed(), config.github.api_base);
            println!("  {}  {}", "token".dimmed(), mask(config.github.token.as_deref()));
            println!("  {}  {}", "llm".dimmed(), config.llm.api_base);
            println!("  {}  {}", "model".dimmed(), config.llm.model);
            println!("  {}  {}", "api key".dimmed(), mask(config.llm.api_key.as_deref()));
        }
    }

    Ok(())
}

fn chat_orchestrator(config: &Config) -> Result<ChatOrchestrator> {
    if config.llm.api_key.is_none() {
        tracing::warn!("No LLM API key configured; chat requests will fail until one is set");
    }
    let provider = OpenAIProvider::new(&config.llm)?;
    Ok(ChatOrchestrator::new(Arc::new(provider), config.context.clone()))
}

/// File text from the repository, or an empty string when it cannot be read
/// as text.
async fn read_repo_text(gateway: &dyn RepoGateway, owner: &str, repo: &str, path: &str) -> String {
    match gateway.read_file(owner, repo, path).await {
        Ok(content) => content.into_text().unwrap_or_else(|| {
            eprintln!("{} {} is binary; asking without its content", "Note:".yellow(), path);
            String::new()
        }),
        Err(e) => {
            eprintln!("{} could not read {}: {}", "Note:".yellow(), path, e);
            String::new()
        }
    }
}

fn mask(secret: Option<&str>) -> String {
    match secret {
        Some(s) if s.chars().count() > 8 => format!("{}…", s.chars().take(4).collect::<String>()),
        Some(_) => "set".to_string(),
        None => "not set".to_string(),
    }
}
