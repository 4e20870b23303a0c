use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

const DEFAULT_CONFIG_FILE: &str = "config/settings";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub memory: MemoryConfig,
    pub prompts: PromptsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub max_tokens: usize,
    pub temperature: f32,
    /// Sent back to the user when the provider answers with blank text.
    pub fallback_reply: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-4.1-mini".to_string(),
            timeout_seconds: 60,
            max_tokens: 1024,
            temperature: 0.7,
            fallback_reply: "Ndati ngatiedzei zvakare, pane chakakanganisika.".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct MemoryConfig {
    pub file_path: PathBuf,
    /// Number of past entries replayed to the provider on each turn.
    pub history_limit: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            file_path: PathBuf::from("data/memory.json"),
            history_limit: crate::services::memory::DEFAULT_RECENT_LIMIT,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PromptsConfig {
    pub global_core: String,
    pub global_guardrails: String,
    pub default_persona: String,
    pub default_language: String,
    pub personas: HashMap<String, String>,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        let mut personas = HashMap::new();
        personas.insert(
            "mukoma".to_string(),
            "You are Mukoma, a warm and practical older-brother figure. \
             Give grounded, respectful advice in plain language."
                .to_string(),
        );

        Self {
            global_core: "You are Mukoma.ai, a helpful assistant for Zimbabwean users. \
                          Answer clearly and keep replies short unless asked for detail."
                .to_string(),
            global_guardrails: "Never give medical, legal or financial instructions as fact. \
                                Decline harmful requests politely."
                .to_string(),
            default_persona: "mukoma".to_string(),
            default_language: "Shona".to_string(),
            personas,
        }
    }
}

impl Settings {
    /// Load settings from `config/settings.*`, `APP__*` variables and the
    /// plain `PORT` / `OPENAI_API_KEY` variables, in that order of precedence.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    pub fn load_from(config_file: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(config_file).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option("llm.api_key", std::env::var("OPENAI_API_KEY").ok())?
            .build()?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self> {
        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }
}
