use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, error, info};

use super::prompt_builder::PromptBuilder;
use crate::models::chat::{ChatMessage, ChatTurnRequest, Role};
use crate::services::llm_service::LlmProvider;
use crate::services::memory::{Conversation, ConversationStore, MemoryError};

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Provider error: {0:#}")]
    Provider(#[source] anyhow::Error),
}

/// Runs one chat turn: prompt, history, provider call, memory write-back
pub struct ChatGateway {
    store: Arc<ConversationStore>,
    provider: Arc<dyn LlmProvider>,
    prompt_builder: PromptBuilder,
    history_limit: usize,
    fallback_reply: String,
}

impl ChatGateway {
    pub fn new(
        store: Arc<ConversationStore>,
        provider: Arc<dyn LlmProvider>,
        prompt_builder: PromptBuilder,
        history_limit: usize,
        fallback_reply: String,
    ) -> Self {
        Self {
            store,
            provider,
            prompt_builder,
            history_limit,
            fallback_reply,
        }
    }

    pub async fn handle(&self, request: ChatTurnRequest) -> Result<String, GatewayError> {
        let start = Instant::now();
        let user_id = request.user_id.as_str();

        let system_prompt = self
            .prompt_builder
            .system_prompt(request.persona.as_deref(), request.language.as_deref());

        let recent = self.store.get_recent(user_id, self.history_limit).await;
        debug!("Loaded {} history entries for user {}", recent.len(), user_id);

        let mut messages = Vec::with_capacity(recent.len() + 2);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend(recent.iter().map(ChatMessage::from));
        messages.push(ChatMessage::user(request.message.clone()));

        let reply = self
            .provider
            .generate(&messages)
            .await
            .map_err(GatewayError::Provider)?;

        let reply = if reply.trim().is_empty() {
            self.fallback_reply.clone()
        } else {
            reply.trim().to_string()
        };

        // Memory is best-effort: a failed write must not cost the user the reply
        if let Err(e) = self.remember(user_id, &request.message, &reply).await {
            error!("Failed to save conversation memory for user {}: {}", user_id, e);
        }

        info!(
            "Chat turn for user {} completed in {}ms",
            user_id,
            start.elapsed().as_millis()
        );

        Ok(reply)
    }

    pub async fn history(&self, user_id: &str) -> Conversation {
        self.store.get_conversation(user_id).await
    }

    pub async fn clear(&self, user_id: &str) -> Result<(), MemoryError> {
        self.store.clear_memory(user_id).await
    }

    async fn remember(&self, user_id: &str, message: &str, reply: &str) -> Result<(), MemoryError> {
        self.store.add_entry(user_id, Role::User, message).await?;
        self.store.add_entry(user_id, Role::Assistant, reply).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PromptsConfig;
    use crate::services::memory::UserId;
    use async_trait::async_trait;
    use mockall::mock;
    use tempfile::TempDir;

    mock! {
        Provider {}

        #[async_trait]
        impl LlmProvider for Provider {
            async fn generate(&self, messages: &[ChatMessage]) -> anyhow::Result<String>;
        }
    }

    fn gateway(dir: &TempDir, provider: MockProvider) -> ChatGateway {
        let store = Arc::new(ConversationStore::new(dir.path().join("memory.json")));
        ChatGateway::new(
            store,
            Arc::new(provider),
            PromptBuilder::new(&PromptsConfig::default()),
            8,
            "fallback".to_string(),
        )
    }

    fn turn(message: &str, user: Option<&str>) -> ChatTurnRequest {
        ChatTurnRequest {
            message: message.to_string(),
            persona: None,
            language: None,
            user_id: UserId::normalize(user),
        }
    }

    #[tokio::test]
    async fn test_turn_is_persisted() {
        let dir = TempDir::new().unwrap();
        let mut provider = MockProvider::new();
        provider
            .expect_generate()
            .times(1)
            .returning(|_| Ok("Mhoro!".to_string()));

        let gateway = gateway(&dir, provider);
        let reply = gateway.handle(turn("hi", Some("u1"))).await.unwrap();

        assert_eq!(reply, "Mhoro!");
        let history = gateway.history("u1").await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role(), Role::User);
        assert_eq!(history[0].content(), "hi");
        assert_eq!(history[1].role(), Role::Assistant);
        assert_eq!(history[1].content(), "Mhoro!");
    }

    #[tokio::test]
    async fn test_history_is_sent_between_system_and_user() {
        let dir = TempDir::new().unwrap();
        let mut provider = MockProvider::new();
        provider
            .expect_generate()
            .withf(|messages: &[ChatMessage]| messages.len() == 2)
            .times(1)
            .returning(|_| Ok("first reply".to_string()));
        provider
            .expect_generate()
            .withf(|messages: &[ChatMessage]| {
                messages.len() == 4
                    && messages[0].role == Role::System
                    && messages[0].content.contains("Language preference: Shona")
                    && messages[1] == ChatMessage::user("one")
                    && messages[2] == ChatMessage::new(Role::Assistant, "first reply")
                    && messages[3] == ChatMessage::user("two")
            })
            .times(1)
            .returning(|_| Ok("second reply".to_string()));

        let gateway = gateway(&dir, provider);
        gateway.handle(turn("one", Some("u1"))).await.unwrap();
        gateway.handle(turn("two", Some("u1"))).await.unwrap();

        assert_eq!(gateway.history("u1").await.len(), 4);
    }

    #[tokio::test]
    async fn test_history_window_is_limited() {
        let dir = TempDir::new().unwrap();
        let mut provider = MockProvider::new();
        // system + 8 history + user
        provider
            .expect_generate()
            .withf(|messages: &[ChatMessage]| messages.len() == 10)
            .times(1)
            .returning(|_| Ok("ok".to_string()));

        let gateway = gateway(&dir, provider);
        for i in 0..20 {
            gateway
                .store
                .add_entry("u1", Role::User, format!("old {}", i))
                .await
                .unwrap();
        }

        gateway.handle(turn("new", Some("u1"))).await.unwrap();
    }

    #[tokio::test]
    async fn test_blank_reply_uses_fallback() {
        let dir = TempDir::new().unwrap();
        let mut provider = MockProvider::new();
        provider
            .expect_generate()
            .returning(|_| Ok("   ".to_string()));

        let gateway = gateway(&dir, provider);
        let reply = gateway.handle(turn("hi", None)).await.unwrap();

        assert_eq!(reply, "fallback");
        assert_eq!(gateway.history("anonymous").await[1].content(), "fallback");
    }

    #[tokio::test]
    async fn test_provider_failure_is_not_persisted() {
        let dir = TempDir::new().unwrap();
        let mut provider = MockProvider::new();
        provider
            .expect_generate()
            .returning(|_| Err(anyhow::anyhow!("provider down")));

        let gateway = gateway(&dir, provider);
        let result = gateway.handle(turn("hi", Some("u1"))).await;

        assert!(matches!(result, Err(GatewayError::Provider(_))));
        assert!(gateway.history("u1").await.is_empty());
    }

    #[tokio::test]
    async fn test_memory_failure_still_returns_reply() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "plain file").unwrap();

        let mut provider = MockProvider::new();
        provider
            .expect_generate()
            .returning(|_| Ok("still here".to_string()));

        let gateway = ChatGateway::new(
            Arc::new(ConversationStore::new(blocker.join("memory.json"))),
            Arc::new(provider),
            PromptBuilder::new(&PromptsConfig::default()),
            8,
            "fallback".to_string(),
        );

        let reply = gateway.handle(turn("hi", Some("u1"))).await.unwrap();
        assert_eq!(reply, "still here");
    }

    #[tokio::test]
    async fn test_clear_delegates_to_store() {
        let dir = TempDir::new().unwrap();
        let mut provider = MockProvider::new();
        provider
            .expect_generate()
            .returning(|_| Ok("reply".to_string()));

        let gateway = gateway(&dir, provider);
        gateway.handle(turn("hi", Some("u1"))).await.unwrap();
        gateway.clear("u1").await.unwrap();

        assert!(gateway.history("u1").await.is_empty());
    }
}
