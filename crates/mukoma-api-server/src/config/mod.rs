mod settings;

pub use settings::{LlmConfig, MemoryConfig, PromptsConfig, ServerConfig, Settings};
