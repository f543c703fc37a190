//! Chat Orchestrator
//!
//! Builds prompts from the repository context, the file the user is looking
//! at and their question, then asks the provider. Every outcome is
//! conversational text: provider failures are turned into guidance for the
//! user instead of being returned as errors.

use std::sync::Arc;

use crate::config::ContextConfig;
use crate::llm::LLMProvider;
use crate::truncate::truncate_content;

const CHAT_SYSTEM_PROMPT: &str = "\
You are a helpful AI assistant specializing in code analysis and explanation.
When asked about specific functions or features:
1. If the function exists in the provided code context, explain it in detail
2. If the function doesn't exist, clearly state that it's not found in the current code
3. Always refer to the actual code content when explaining
4. If there's an error or limitation, explain it clearly";

const REVIEW_SYSTEM_PROMPT: &str = "You are an expert code reviewer and technical writer.";

/// Reply used when the model returns nothing.
pub const EMPTY_REPLY: &str = "I couldn't find any information about that in the current code. \
Please make sure you have a file selected and try asking about functions or features that exist in the code.";

const CONTEXT_TRUNCATED_NOTICE: &str = "\n... (repository context truncated)";

/// The file the user currently has open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileContext {
    pub path: String,
    pub content: String,
}

pub struct ChatOrchestrator {
    provider: Arc<dyn LLMProvider>,
    limits: ContextConfig,
}

impl ChatOrchestrator {
    pub fn new(provider: Arc<dyn LLMProvider>, limits: ContextConfig) -> Self {
        Self { provider, limits }
    }

    /// The user prompt for a chat turn.
    ///
    /// Repository context is capped at `max_context_chars`; the file goes
    /// through the truncator with `max_file_chars`.
    pub fn build_chat_prompt(&self, query: &str, file: &FileContext, repo_context: Option<&str>) -> String {
        let mut prompt = String::new();

        if let Some(context) = repo_context.filter(|c| !c.trim().is_empty()) {
            prompt.push_str("Repository context:\n");
            prompt.push_str(&cap_chars(context, self.limits.max_context_chars));
            prompt.push_str("\n\n");
        }

        let code = truncate_content(&file.content, &file.path, self.limits.max_file_chars);
        prompt.push_str(&format!(
            "Context: I'm looking at the file {}\n\nCode content:\n{}\n\nQuestion: {}\n",
            file.path, code, query
        ));
        prompt
    }

    pub fn build_explain_prompt(&self, code: &str, path: &str) -> String {
        let code = truncate_content(code, path, self.limits.max_file_chars);
        format!(
            "Analyze this code from {path} and explain:\n\
             1. What it does\n\
             2. Key components and functions\n\
             3. Potential improvements\n\n\
             Code:\n{code}\n"
        )
    }

    /// Answer a question about the open file, optionally with repository context.
    #[tracing::instrument(skip_all, fields(path = %file.path, model = self.provider.model()))]
    pub async fn chat(&self, query: &str, file: &FileContext, repo_context: Option<&str>) -> String {
        let prompt = self.build_chat_prompt(query, file, repo_context);
        tracing::debug!(prompt_chars = prompt.chars().count(), "Chat prompt assembled");

        match self.provider.complete(CHAT_SYSTEM_PROMPT, &prompt).await {
            Ok(text) if text.trim().is_empty() => EMPTY_REPLY.to_string(),
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Chat completion failed");
                chat_error_reply(&e)
            }
        }
    }

    /// Review a piece of code: purpose, components, improvements.
    #[tracing::instrument(skip_all, fields(path = %path))]
    pub async fn explain_code(&self, code: &str, path: &str) -> String {
        let prompt = self.build_explain_prompt(code, path);
        match self.provider.complete(REVIEW_SYSTEM_PROMPT, &prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Code explanation failed");
                format!("Error analyzing code: {e}")
            }
        }
    }
}

fn chat_error_reply(error: &anyhow::Error) -> String {
    format!(
        "I encountered an error while processing your question. Here's what you can try:\n\
         1. Make sure you have a file selected\n\
         2. Check if the function or feature you're asking about exists in the current file\n\
         3. Try rephrasing your question\n\n\
         Error details: {error}"
    )
}

/// At most `limit` characters, with a notice when anything was cut.
pub fn cap_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{CONTEXT_TRUNCATED_NOTICE}", &text[..cut]),
        None => text.to_string(),
    }
}
