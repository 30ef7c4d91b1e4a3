//! Configuration validation rules.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` when an endpoint setting is empty and
    /// `ConfigError::Invalid` when a numeric limit is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value, hint) in [
            ("base_url", &self.base_url, "Set AETHERFORGE_BASE_URL or BASE_URL"),
            ("api_key", &self.api_key, "Set AETHERFORGE_API_KEY or API_KEY (any value works for local servers)"),
            ("model_name", &self.model_name, "Set AETHERFORGE_MODEL_NAME or MODEL_NAME"),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing { field: field.into(), hint: hint.into() });
            }
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if !(1..=60).contains(&self.fetch_timeout_secs) {
            return Err(ConfigError::Invalid {
                field: "fetch_timeout_secs".into(),
                reason: "must be between 1 and 60 seconds".into(),
            });
        }

        if self.cache_max_age_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "cache_max_age_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.max_rounds == 0 {
            return Err(ConfigError::Invalid { field: "max_rounds".into(), reason: "must be at least 1".into() });
        }

        if self.tool_text_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "tool_text_limit".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid {
                field: "temperature".into(),
                reason: "must be between 0.0 and 2.0".into(),
            });
        }

        if self.max_rounds > 10 {
            tracing::warn!(max_rounds = self.max_rounds, "High round limit; a looping model may issue many fetches");
        }

        Ok(())
    }
}
