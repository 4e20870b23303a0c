use std::sync::Arc;
use axum::extract::FromRef;

use crate::config::Settings;
use crate::services::{ChatGateway, ConversationStore, LlmProvider, PromptBuilder};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ChatGateway>,
    pub store: Arc<ConversationStore>,
    pub settings: Arc<Settings>,
}

impl FromRef<AppState> for Arc<ChatGateway> {
    fn from_ref(state: &AppState) -> Self {
        state.gateway.clone()
    }
}

impl AppState {
    /// Wire the store, prompt builder and gateway from settings
    pub fn new(settings: Settings, provider: Arc<dyn LlmProvider>) -> Self {
        let store = Arc::new(ConversationStore::new(settings.memory.file_path.clone()));

        let gateway = Arc::new(ChatGateway::new(
            store.clone(),
            provider,
            PromptBuilder::new(&settings.prompts),
            settings.memory.history_limit,
            settings.llm.fallback_reply.clone(),
        ));

        Self {
            gateway,
            store,
            settings: Arc::new(settings),
        }
    }
}
