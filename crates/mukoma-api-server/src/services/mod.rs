pub mod chat;
pub mod llm_service;
pub mod memory;

pub use chat::{ChatGateway, PromptBuilder};
pub use llm_service::{LlmProvider, LlmService};
pub use memory::ConversationStore;
