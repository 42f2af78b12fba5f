//! Stage 1 — routing classification.
//!
//! One cheap completion call on the snippet prompt decides whether the
//! message is deal-related at all, its lifecycle stage, and whether
//! attachments merit a deeper pass. Everything downstream branches on this.

use std::sync::Arc;

use tracing::debug;

use crate::error::PipelineError;
use crate::llm::RequestExecutor;
use crate::pipeline::types::{InboundEmail, Routing};
use crate::pipeline::{prompts, schema};

/// Routes an inbound email via the snippet prompt and routing contract.
pub struct DecisionRouter {
    executor: Arc<RequestExecutor>,
    snippet_budget: usize,
}

impl DecisionRouter {
    pub fn new(executor: Arc<RequestExecutor>, snippet_budget: usize) -> Self {
        Self {
            executor,
            snippet_budget,
        }
    }

    /// Classify the message. A false `is_deal` short-circuits the pipeline
    /// in the caller — no extraction calls are ever issued for it.
    pub async fn route(&self, email: &InboundEmail) -> Result<Routing, PipelineError> {
        let prompt = prompts::snippet_prompt(email, self.snippet_budget);
        let payload = self
            .executor
            .execute(
                &prompts::routing_system_prompt(),
                &prompt,
                schema::routing_schema(),
            )
            .await?;

        let routing: Routing = serde_json::from_value(payload)
            .map_err(|e| PipelineError::Routing(format!("non-conforming routing payload: {e}")))?;

        debug!(
            is_deal = routing.is_deal,
            stage = ?routing.deal_stage,
            parse_attachments = routing.should_parse_attachments,
            "Routing decision"
        );
        Ok(routing)
    }
}
