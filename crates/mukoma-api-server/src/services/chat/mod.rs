//! Chat turn orchestration
//!
//! Combines the persona prompt, the user's recent history and the provider
//! call, then writes the exchange back to conversation memory.

mod gateway;
mod prompt_builder;

pub use gateway::{ChatGateway, GatewayError};
pub use prompt_builder::PromptBuilder;
