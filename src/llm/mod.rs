//! Language model access
//!
//! - [`LLMProvider`]: the trait the chat layer depends on
//! - [`OpenAIProvider`]: any OpenAI-compatible chat completions endpoint
//!   (Groq by default)

pub mod openai;
pub mod provider;
pub mod types;

pub use openai::OpenAIProvider;
pub use provider::LLMProvider;
pub use types::{CompletionResponse, Message, Role, Usage};
