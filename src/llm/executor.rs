//! Schema-constrained request execution.
//!
//! One `execute()` call is one logical completion: build the two-message
//! request, run it under the retry policy, and resolve the typed JSON
//! payload. Empty content and undecodable payloads are fatal for the call.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::ExtractorConfig;
use crate::error::LlmError;
use crate::llm::provider::{ChatMessage, CompletionRequest, JsonSchema, LlmProvider};
use crate::llm::retry;

/// Executes schema-constrained completion calls against a provider.
pub struct RequestExecutor {
    provider: Arc<dyn LlmProvider>,
    max_retries: u32,
    base_delay: Duration,
    temperature: f32,
}

impl RequestExecutor {
    pub fn new(provider: Arc<dyn LlmProvider>, config: &ExtractorConfig) -> Self {
        Self {
            provider,
            max_retries: config.max_retries,
            base_delay: config.base_retry_delay,
            temperature: config.temperature,
        }
    }

    /// Issue one schema-constrained completion and decode its JSON payload.
    pub async fn execute(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: JsonSchema,
    ) -> Result<serde_json::Value, LlmError> {
        let label = schema.name;

        let response = retry::with_retry(self.max_retries, self.base_delay, label, || {
            let request = CompletionRequest::new(vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(user_prompt),
            ])
            .with_temperature(self.temperature)
            .with_response_schema(schema.clone());
            let provider = Arc::clone(&self.provider);
            async move { provider.complete(request).await }
        })
        .await?;

        if response.content.trim().is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: self.provider.model_name().to_string(),
                reason: "empty completion content".to_string(),
            });
        }

        let (input_cost, output_cost) = self.provider.cost_per_token();
        let cost = input_cost * Decimal::from(response.input_tokens)
            + output_cost * Decimal::from(response.output_tokens);
        debug!(
            schema = label,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            cost_usd = %cost,
            "Completion call finished"
        );

        serde_json::from_str(&response.content).map_err(|e| LlmError::InvalidResponse {
            provider: self.provider.model_name().to_string(),
            reason: format!("undecodable completion payload: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::llm::provider::{CompletionResponse, FinishReason};

    /// Mock provider returning a fixed body (or a scripted error) per call.
    struct MockProvider {
        body: Result<String, fn() -> LlmError>,
        calls: AtomicU32,
    }

    impl MockProvider {
        fn with_body(body: &str) -> Self {
            Self {
                body: Ok(body.to_string()),
                calls: AtomicU32::new(0),
            }
        }

        fn with_error(make: fn() -> LlmError) -> Self {
            Self {
                body: Err(make),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        fn model_name(&self) -> &str {
            "mock"
        }

        fn cost_per_token(&self) -> (Decimal, Decimal) {
            (Decimal::ZERO, Decimal::ZERO)
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.body {
                Ok(content) => Ok(CompletionResponse {
                    content: content.clone(),
                    input_tokens: 100,
                    output_tokens: 50,
                    finish_reason: FinishReason::Stop,
                }),
                Err(make) => Err(make()),
            }
        }
    }

    fn schema() -> JsonSchema {
        JsonSchema {
            name: "test_v1",
            schema: serde_json::json!({"type": "object"}),
        }
    }

    fn executor(provider: Arc<MockProvider>) -> RequestExecutor {
        RequestExecutor::new(provider, &ExtractorConfig::default())
    }

    #[tokio::test]
    async fn decodes_json_payload() {
        let provider = Arc::new(MockProvider::with_body(r#"{"isDeal": true}"#));
        let executor = executor(Arc::clone(&provider));

        let value = executor.execute("sys", "user", schema()).await.unwrap();
        assert_eq!(value["isDeal"], true);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_content_is_fatal() {
        let provider = Arc::new(MockProvider::with_body("   "));
        let executor = executor(Arc::clone(&provider));

        let result = executor.execute("sys", "user", schema()).await;
        assert!(matches!(result, Err(LlmError::InvalidResponse { .. })));
        // No retry on content errors.
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn undecodable_payload_is_fatal() {
        let provider = Arc::new(MockProvider::with_body("not json at all"));
        let executor = executor(Arc::clone(&provider));

        let result = executor.execute("sys", "user", schema()).await;
        assert!(matches!(result, Err(LlmError::InvalidResponse { .. })));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_retries_to_ceiling() {
        let provider = Arc::new(MockProvider::with_error(|| LlmError::RateLimited {
            provider: "mock".into(),
            retry_after: None,
        }));
        let executor = executor(Arc::clone(&provider));

        let result = executor.execute("sys", "user", schema()).await;
        assert!(matches!(result, Err(LlmError::RateLimited { .. })));
        // Default ceiling of 5 retries: 6 attempts total.
        assert_eq!(provider.calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn request_failure_propagates_without_retry() {
        let provider = Arc::new(MockProvider::with_error(|| LlmError::RequestFailed {
            provider: "mock".into(),
            reason: "HTTP 500".into(),
        }));
        let executor = executor(Arc::clone(&provider));

        let result = executor.execute("sys", "user", schema()).await;
        assert!(matches!(result, Err(LlmError::RequestFailed { .. })));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
