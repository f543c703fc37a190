//! Server application state

use std::sync::Arc;

use crate::chat::ChatOrchestrator;
use crate::config::ContextConfig;
use crate::github::RepoGateway;

/// Shared by every route handler. Nothing in here is mutated after start-up.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn RepoGateway>,
    pub chat: Arc<ChatOrchestrator>,
    pub context: ContextConfig,
}

impl AppState {
    pub fn new(gateway: Arc<dyn RepoGateway>, chat: ChatOrchestrator, context: ContextConfig) -> Self {
        Self {
            gateway,
            chat: Arc::new(chat),
            context,
        }
    }
}
