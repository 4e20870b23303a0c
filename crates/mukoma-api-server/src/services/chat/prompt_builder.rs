use std::collections::HashMap;

use tracing::debug;

use crate::config::PromptsConfig;

/// Builds the system message from the global prompts, the persona and the
/// language preference.
pub struct PromptBuilder {
    global_core: String,
    global_guardrails: String,
    personas: HashMap<String, String>,
    default_persona: String,
    default_language: String,
}

impl PromptBuilder {
    pub fn new(config: &PromptsConfig) -> Self {
        let personas = config
            .personas
            .iter()
            .map(|(name, prompt)| (name.to_lowercase(), prompt.clone()))
            .collect();

        Self {
            global_core: config.global_core.clone(),
            global_guardrails: config.global_guardrails.clone(),
            personas,
            default_persona: config.default_persona.to_lowercase(),
            default_language: config.default_language.clone(),
        }
    }

    /// Persona text for `persona`, falling back to the default persona
    pub fn persona_prompt(&self, persona: Option<&str>) -> &str {
        if let Some(prompt) = persona.and_then(|name| self.personas.get(&name.to_lowercase())) {
            return prompt;
        }

        if let Some(name) = persona {
            debug!("Unknown persona '{}', using '{}'", name, self.default_persona);
        }

        self.personas
            .get(&self.default_persona)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn system_prompt(&self, persona: Option<&str>, language: Option<&str>) -> String {
        let language = language.unwrap_or(&self.default_language);
        let language_line = format!("Language preference: {}", language);

        let sections: Vec<&str> = [
            self.global_core.as_str(),
            self.global_guardrails.as_str(),
            self.persona_prompt(persona),
            language_line.as_str(),
        ]
        .into_iter()
        .map(str::trim)
        .filter(|section| !section.is_empty())
        .collect();

        sections.join("\n\n")
    }
}
