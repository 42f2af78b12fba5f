//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Extraction pipeline configuration.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Completion model identifier.
    pub model: String,
    /// Character budget for the routing snippet prompt.
    pub snippet_budget: usize,
    /// Maximum rate-limit retries per completion call.
    pub max_retries: u32,
    /// Base delay for exponential backoff when the service gives no hint.
    pub base_retry_delay: Duration,
    /// Sampling temperature (extraction wants determinism).
    pub temperature: f32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            snippet_budget: 1000,
            max_retries: 5,
            base_retry_delay: Duration::from_millis(500),
            temperature: 0.0,
        }
    }
}

impl ExtractorConfig {
    /// Build a config from `DEAL_ASSIST_*` environment overrides.
    ///
    /// Unset variables keep their defaults; set-but-unparseable values are
    /// a hard error rather than a silent fallback.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(model) = std::env::var("DEAL_ASSIST_MODEL") {
            config.model = model;
        }
        if let Some(budget) = parse_env("DEAL_ASSIST_SNIPPET_BUDGET")? {
            config.snippet_budget = budget;
        }
        if let Some(retries) = parse_env("DEAL_ASSIST_MAX_RETRIES")? {
            config.max_retries = retries;
        }
        if let Some(ms) = parse_env("DEAL_ASSIST_BASE_RETRY_DELAY_MS")? {
            config.base_retry_delay = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

/// Parse an optional numeric environment variable.
fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{e}"),
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = ExtractorConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.snippet_budget, 1000);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.base_retry_delay, Duration::from_millis(500));
        assert_eq!(config.temperature, 0.0);
    }

    #[test]
    fn parse_env_missing_is_none() {
        let result: Option<u32> = parse_env("DEAL_ASSIST_TEST_UNSET_VAR").unwrap();
        assert!(result.is_none());
    }
}
