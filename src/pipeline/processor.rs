//! Pipeline orchestrator — routes, gates, extracts, assembles.
//!
//! Flow:
//! 1. `DecisionRouter::route()` — one cheap classification call
//! 2. `is_deal == false` → short-circuit, no extraction calls issued
//! 3. `ExtractionEngine::extract()` — minimal always, deep when warranted
//!
//! Callers get either a complete `DecisionTreeResult` or an error naming
//! the stage that failed; a failed stage is never truncated into an
//! empty-but-successful result.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ExtractorConfig;
use crate::error::PipelineError;
use crate::llm::{LlmProvider, RequestExecutor};
use crate::pipeline::engine::ExtractionEngine;
use crate::pipeline::router::DecisionRouter;
use crate::pipeline::types::{DecisionTreeResult, InboundEmail};

/// The extraction decision pipeline. Stateless and reentrant — share one
/// instance across concurrent messages via `Arc`.
pub struct DealPipeline {
    router: DecisionRouter,
    engine: ExtractionEngine,
}

impl DealPipeline {
    pub fn new(provider: Arc<dyn LlmProvider>, config: &ExtractorConfig) -> Self {
        let executor = Arc::new(RequestExecutor::new(provider, config));
        Self {
            router: DecisionRouter::new(Arc::clone(&executor), config.snippet_budget),
            engine: ExtractionEngine::new(executor),
        }
    }

    /// Process one inbound email through the full decision tree.
    pub async fn process(&self, email: &InboundEmail) -> Result<DecisionTreeResult, PipelineError> {
        info!(
            from = %email.from,
            subject = %email.subject,
            "Processing inbound email"
        );

        let routing = self.router.route(email).await?;

        if !routing.is_deal {
            debug!(
                reason = routing.routing_reason.as_deref().unwrap_or("none"),
                "Not a deal — skipping extraction"
            );
            return Ok(DecisionTreeResult {
                routing,
                minimal: None,
                deep: None,
            });
        }

        let outcome = self.engine.extract(email, &routing).await?;

        info!(
            stage = ?routing.deal_stage,
            deep = outcome.deep.is_some(),
            "Extraction complete"
        );
        Ok(DecisionTreeResult {
            routing,
            minimal: Some(outcome.minimal),
            deep: outcome.deep,
        })
    }
}
