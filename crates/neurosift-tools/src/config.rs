//! Service configuration.

use reqwest::Url;

/// Public endpoint used when no override is configured.
pub const DEFAULT_API_URL: &str = "https://neurosift-chat-agent-tools.vercel.app/api";

/// Environment variable overriding [`DEFAULT_API_URL`].
pub const API_URL_ENV: &str = "NEUROSIFT_TOOLS_API_URL";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the remote tool catalog, without trailing slash.
    pub api_url: String,
}

impl Config {
    /// Build a configuration from a base URL, rejecting anything that is not
    /// an absolute http(s) URL.
    pub fn new(api_url: impl Into<String>) -> Result<Self, ConfigError> {
        let api_url = api_url.into();
        let trimmed = api_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }

        let parsed = Url::parse(trimmed).map_err(|e| ConfigError::InvalidApiUrl {
            url: api_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidApiUrl {
                url: api_url.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self {
            api_url: trimmed.to_string(),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API base URL is empty: set NEUROSIFT_TOOLS_API_URL or leave it unset")]
    EmptyApiUrl,

    #[error("invalid API base URL '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },
}
