//! Suggestion provider configuration.
//!
//! # Invariants
//! - A validated config has a non-empty key, a non-empty chain of non-blank
//!   model ids, and a non-zero timeout.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_BASE_URL: &str = "GEMINI_BASE_URL";
pub const ENV_MODELS: &str = "GEMINI_MODELS";
pub const ENV_TIMEOUT_SECS: &str = "GEMINI_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Models tried in order when the previous one is rate limited.
pub const DEFAULT_MODEL_CHAIN: &[&str] = &[
    "gemini-2.5-flash-lite",
    "gemini-2.0-flash-lite",
    "gemini-2.0-flash",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingApiKey,
    EmptyModelChain,
    BlankModelId,
    InvalidTimeout(String),
    HttpClient(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "{ENV_API_KEY} is not set"),
            Self::EmptyModelChain => write!(f, "model fallback chain must not be empty"),
            Self::BlankModelId => write!(f, "model fallback chain contains a blank id"),
            Self::InvalidTimeout(value) => {
                write!(f, "invalid {ENV_TIMEOUT_SECS} `{value}`; expected seconds > 0")
            }
            Self::HttpClient(message) => write!(f, "failed to build HTTP client: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Settings for the Gemini-backed suggestion client.
#[derive(Clone, PartialEq, Eq)]
pub struct SuggestionConfig {
    pub api_key: String,
    pub base_url: String,
    pub models: Vec<String>,
    pub timeout: Duration,
}

// Keeps the key out of debug output.
impl std::fmt::Debug for SuggestionConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("models", &self.models)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SuggestionConfig {
    /// Config with default endpoint, chain and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            models: DEFAULT_MODEL_CHAIN.iter().map(|m| m.to_string()).collect(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads `GEMINI_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset or blank values fall back
    /// to defaults, except the API key which is required.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = get(ENV_API_KEY).ok_or(ConfigError::MissingApiKey)?;
        let mut config = Self::new(api_key.trim());

        if let Some(base_url) = get(ENV_BASE_URL) {
            config.base_url = base_url.trim().trim_end_matches('/').to_string();
        }
        if let Some(models) = get(ENV_MODELS) {
            config.models = models.split(',').map(|m| m.trim().to_string()).collect();
        }
        if let Some(timeout) = get(ENV_TIMEOUT_SECS) {
            let secs = timeout
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout(timeout.clone()))?;
            config.timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.models.is_empty() {
            return Err(ConfigError::EmptyModelChain);
        }
        if self.models.iter().any(|model| model.trim().is_empty()) {
            return Err(ConfigError::BlankModelId);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("0".to_string()));
        }
        Ok(())
    }
}
