//! The Orchestrator boundary.
//!
//! Anything that can turn a list of chat messages into text implements
//! [`LLMProvider`]. The chat layer never sees HTTP details.

use anyhow::Result;
use async_trait::async_trait;

use super::types::{CompletionResponse, Message};

#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Model identifier, for logs.
    fn model(&self) -> &str;

    /// Send a chat completion request.
    async fn completion(&self, messages: &[Message]) -> Result<CompletionResponse>;

    /// One system prompt plus one user prompt.
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let messages = [Message::system(system), Message::user(user)];
        Ok(self.completion(&messages).await?.content)
    }
}
