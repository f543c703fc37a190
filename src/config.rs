//! Configuration management for GitSage
//!
//! Settings live in `~/.gitsage/config.toml`. Credentials and endpoints can be
//! overridden from the environment so the server runs without a config file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::github::RetryPolicy;

/// Default GitHub REST endpoint
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Default chat completions endpoint (Groq, OpenAI-compatible)
pub const LLM_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default chat model
pub const LLM_MODEL: &str = "llama-3.3-70b-versatile";

/// GitHub gateway settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GitHubConfig {
    /// REST API base URL
    #[serde(default = "default_github_api")]
    pub api_base: String,
    /// Personal access token, sent as a bearer credential when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// User-Agent header (GitHub rejects requests without one)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retry policy for 429/5xx responses
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: default_github_api(),
            token: None,
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Language model endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    /// Full chat completions URL
    #[serde(default = "default_llm_api")]
    pub api_base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_llm_api(),
            api_key: None,
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Budgets and heuristics for context extraction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextConfig {
    /// Files longer than this (in characters) are condensed before prompting
    #[serde(default = "default_max_file_chars")]
    pub max_file_chars: usize,
    /// Cap on the formatted repository context inside a chat prompt
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
    /// README excerpt length in the formatted context
    #[serde(default = "default_readme_chars")]
    pub readme_chars: usize,
    /// Deepest tree level rendered in the context
    #[serde(default = "default_tree_depth")]
    pub tree_depth: usize,
    /// File names (lower-case) treated as key files
    #[serde(default = "default_key_files")]
    pub key_files: Vec<String>,
    /// Exact repository paths treated as key files
    #[serde(default)]
    pub key_paths: Vec<String>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_file_chars: default_max_file_chars(),
            max_context_chars: default_max_context_chars(),
            readme_chars: default_readme_chars(),
            tree_depth: default_tree_depth(),
            key_files: default_key_files(),
            key_paths: Vec::new(),
        }
    }
}

impl ContextConfig {
    /// Key-file catalog built from `key_files` and `key_paths`.
    pub fn key_file_catalog(&self) -> crate::analyzer::KeyFileCatalog {
        crate::analyzer::KeyFileCatalog::new(&self.key_files, self.key_paths.iter().cloned())
    }
}

/// GitSage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub context: ContextConfig,
    /// Version of config schema (for future migrations)
    #[serde(default = "default_version")]
    pub version: u32,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github: GitHubConfig::default(),
            llm: LlmConfig::default(),
            context: ContextConfig::default(),
            version: default_version(),
        }
    }
}

fn default_github_api() -> String {
    GITHUB_API_URL.to_string()
}

fn default_user_agent() -> String {
    format!("gitsage/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_llm_api() -> String {
    LLM_API_URL.to_string()
}

fn default_llm_model() -> String {
    LLM_MODEL.to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_max_file_chars() -> usize {
    10_000
}

fn default_max_context_chars() -> usize {
    20_000
}

fn default_readme_chars() -> usize {
    2_000
}

fn default_tree_depth() -> usize {
    3
}

fn default_key_files() -> Vec<String> {
    crate::analyzer::DEFAULT_KEY_FILES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Config {
    /// Get the config file path (~/.gitsage/config.toml)
    pub fn path() -> Result<PathBuf> {
        Ok(gitsage_dir()?.join("config.toml"))
    }

    /// Check if a config file exists
    pub fn exists() -> bool {
        Self::path().map(|p| p.exists()).unwrap_or(false)
    }

    /// Load config from disk, or return None if it doesn't exist
    pub fn load() -> Result<Option<Self>> {
        Self::load_from(&Self::path()?)
    }

    /// Load config from `path`, or return None if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .context("Failed to read config file")?;
        let config: Self = toml::from_str(&content)
            .context("Failed to parse config file")?;
        Ok(Some(config))
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Save config to `path`, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Load the config file (or defaults) and apply environment overrides
    pub fn resolve() -> Result<Self> {
        let mut config = Self::load()?.unwrap_or_default();
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    ///
    /// Empty values are ignored so an exported-but-blank variable does not
    /// wipe a token from the config file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
        if let Some(url) = get("GITHUB_API_URL") {
            self.github.api_base = url;
        }
        if let Some(key) = get("LLM_API_KEY").or_else(|| get("GROQ_API_KEY")) {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = get("LLM_API_URL") {
            self.llm.api_base = url;
        }
        if let Some(model) = get("LLM_MODEL") {
            self.llm.model = model;
        }
    }
}

/// Get the base gitsage directory path (~/.gitsage)
pub fn gitsage_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".gitsage"))
}
