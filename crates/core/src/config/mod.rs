//! Application configuration with layered loading.
//!
//! Sources, highest precedence first:
//!
//! 1. Environment variables (AETHERFORGE_*)
//! 2. The bare `BASE_URL`, `MODEL_NAME` and `API_KEY` variables
//! 3. TOML config file (if AETHERFORGE_CONFIG_FILE set)
//! 4. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the OpenAI-compatible chat completions API.
    ///
    /// Set via AETHERFORGE_BASE_URL or BASE_URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token for the model endpoint. Local servers accept any non-empty value.
    ///
    /// Set via AETHERFORGE_API_KEY or API_KEY.
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Model identifier sent with every chat request.
    ///
    /// Set via AETHERFORGE_MODEL_NAME or MODEL_NAME.
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Path to the SQLite page cache.
    ///
    /// Set via AETHERFORGE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for page fetches.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Default per-fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Maximum age of a cached page before it is fetched again.
    #[serde(default = "default_cache_max_age_secs")]
    pub cache_max_age_secs: u64,

    /// Maximum number of model round trips per conversation.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,

    /// Number of characters of page text handed back to the model per fetch.
    #[serde(default = "default_tool_text_limit")]
    pub tool_text_limit: usize,

    /// Sampling temperature for tool-augmented chats.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_base_url() -> String {
    "http://localhost:11434/v1".into()
}

fn default_api_key() -> String {
    "local".into()
}

fn default_model_name() -> String {
    "llama3.1:8b".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".cache").join("aetherforge_cache.sqlite")
}

/// User agent sent with every page fetch unless configured otherwise.
pub const DEFAULT_USER_AGENT: &str = "AetherForge/0.1 (+local)";

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}

fn default_fetch_timeout_secs() -> u64 {
    15
}

fn default_cache_max_age_secs() -> u64 {
    86_400
}

fn default_max_rounds() -> usize {
    3
}

fn default_tool_text_limit() -> usize {
    2_000
}

fn default_temperature() -> f32 {
    0.2
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: default_api_key(),
            model_name: default_model_name(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            cache_max_age_secs: default_cache_max_age_secs(),
            max_rounds: default_max_rounds(),
            tool_text_limit: default_tool_text_limit(),
            temperature: default_temperature(),
        }
    }
}

impl AppConfig {
    /// Fetch timeout as Duration for use with reqwest.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Cache freshness window as Duration.
    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("AETHERFORGE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment
            .merge(Env::raw().only(&["base_url", "model_name", "api_key"]))
            .merge(
                Env::prefixed("AETHERFORGE_")
                    .ignore(&["config_file"])
                    .map(|key| key.as_str().to_lowercase().into())
                    .split("__"),
            );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
