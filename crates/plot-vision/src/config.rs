//! Service configuration.

/// Environment variable holding the OpenRouter API key.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Chat-completions endpoint of the LLM gateway.
pub const COMPLETIONS_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Referer sent to identify the calling application.
pub const REFERER: &str = "https://neurosift.app";

/// Vision model used for plot analysis.
pub const MODEL: &str = "openai/gpt-4o";

/// Top-level configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Bearer token for the LLM gateway.
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
}

impl Config {
    /// Build the configuration. The API key is required; an empty value
    /// counts as missing.
    pub fn new(api_key: Option<String>) -> Result<Self, ConfigError> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        Ok(Self {
            api_key,
            endpoint: COMPLETIONS_URL.to_string(),
            model: MODEL.to_string(),
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("OPENROUTER_API_KEY environment variable is required")]
    MissingApiKey,
}
