//! LLM integration for Deal Assist.
//!
//! The pipeline talks to the completion service through the `LlmProvider`
//! trait; `OpenAiProvider` is the production transport. `RequestExecutor`
//! wraps a provider with schema-constrained prompting and the rate-limit
//! retry policy.

mod costs;
pub mod executor;
pub mod openai;
pub mod provider;
pub(crate) mod retry;

pub use executor::RequestExecutor;
pub use openai::OpenAiProvider;
pub use provider::*;

use std::sync::Arc;

use secrecy::SecretString;

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: SecretString,
    pub model: String,
    /// OpenAI-compatible endpoint override (proxies, local servers).
    pub base_url: Option<String>,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Arc<dyn LlmProvider> {
    let mut provider = OpenAiProvider::new(config.api_key.clone(), &config.model);
    if let Some(ref base_url) = config.base_url {
        provider = provider.with_base_url(base_url);
    }
    tracing::info!("Using OpenAI-compatible provider (model: {})", config.model);
    Arc::new(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_provider_reports_model_name() {
        // API keys are only validated at request time.
        let config = LlmConfig {
            api_key: SecretString::from("sk-test"),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
        };
        let provider = create_provider(&config);
        assert_eq!(provider.model_name(), "gpt-4o-mini");
    }
}
