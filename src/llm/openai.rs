//! OpenAI-compatible chat completions provider.
//!
//! Groq, OpenAI and most self-hosted servers accept the same request shape,
//! so one implementation covers them; only the URL, key and model differ.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::provider::LLMProvider;
use super::types::{CompletionResponse, Message, Role, Usage};
use crate::config::LlmConfig;

const REQUEST_TIMEOUT_SECS: u64 = 60;

pub struct OpenAIProvider {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIProvider {
    /// A missing key is accepted here; requests fail until one is configured.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build LLM HTTP client")?;

        Ok(Self {
            client,
            api_url: config.api_base.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn completion(&self, messages: &[Message]) -> Result<CompletionResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .context("No LLM API key configured (set GROQ_API_KEY or llm.api_key)")?;

        let request = ChatRequest {
            model: &self.model,
            messages: messages.iter().map(ApiMessage::from).collect(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(model = %self.model, messages = messages.len(), "Sending chat completion");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to the LLM endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("LLM API error ({}): {}", status.as_u16(), error_text);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse LLM response")?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .context("No choices returned from the LLM endpoint")?;

        if let Some(usage) = &chat_response.usage {
            tracing::debug!(total_tokens = usage.total_tokens, "Chat completion finished");
        }

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            usage: chat_response.usage.map(Usage::from),
        })
    }
}

// ─────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a Message> for ApiMessage<'a> {
    fn from(msg: &'a Message) -> Self {
        Self {
            role: match msg.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: &msg.content,
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ApiResponseMessage,
}

#[derive(Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
    #[serde(default)]
    total_tokens: usize,
}

impl From<ApiUsage> for Usage {
    fn from(u: ApiUsage) -> Self {
        Self {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}
