//! Stage 2 — minimal and conditional deep extraction.
//!
//! Minimal extraction is cheap and always useful; deep extraction is
//! reserved for stages and signals where contractual detail is actually
//! likely, bounding completion-service spend. When both run they execute
//! concurrently and join all-or-nothing: there is no partial
//! "minimal succeeded, deep failed" result.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::PipelineError;
use crate::llm::RequestExecutor;
use crate::pipeline::evidence;
use crate::pipeline::types::{DeepExtraction, InboundEmail, MinimalExtraction, Routing};
use crate::pipeline::{prompts, schema};

/// Vocabulary hinting that deal terms live in an attachment. Matched
/// word-bounded so the bare `io` (insertion order) doesn't fire inside
/// ordinary words like "collaboration".
static ATTACHMENT_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(contract|agreement|sow|statement of work|msa|master service|brief|insertion order|io|terms and conditions)\b",
    )
    .unwrap()
});

/// Case-insensitive keyword scan over subject + body. Operates on message
/// text only — actual attachment presence or content is never consulted.
pub fn has_attachment_keywords(email: &InboundEmail) -> bool {
    let haystack = format!("{} {}", email.subject, email.body);
    ATTACHMENT_KEYWORDS.is_match(&haystack)
}

/// Result of the extraction stage.
#[derive(Debug)]
pub struct ExtractionOutcome {
    pub minimal: MinimalExtraction,
    pub deep: Option<DeepExtraction>,
}

/// Runs the extraction calls for a message already routed as a deal.
pub struct ExtractionEngine {
    executor: Arc<RequestExecutor>,
}

impl ExtractionEngine {
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Deep eligibility: late-stage signals, the router's attachment hint,
    /// or the keyword heuristic.
    pub fn should_run_deep(email: &InboundEmail, routing: &Routing) -> bool {
        routing.deal_stage.is_deep_eligible()
            || routing.should_parse_attachments
            || has_attachment_keywords(email)
    }

    /// Run minimal extraction, plus deep when warranted.
    ///
    /// Caller guarantees `routing.is_deal`. The minimal call starts before
    /// the deep decision is even computed; both calls are awaited before
    /// returning, and either failure fails the stage as a unit.
    pub async fn extract(
        &self,
        email: &InboundEmail,
        routing: &Routing,
    ) -> Result<ExtractionOutcome, PipelineError> {
        let prompt = prompts::full_prompt(email);

        let minimal_task = tokio::spawn({
            let executor = Arc::clone(&self.executor);
            let prompt = prompt.clone();
            async move {
                executor
                    .execute(
                        &prompts::minimal_system_prompt(),
                        &prompt,
                        schema::minimal_schema(),
                    )
                    .await
            }
        });

        let run_deep = Self::should_run_deep(email, routing);
        debug!(run_deep, stage = ?routing.deal_stage, "Deep eligibility decided");

        // Deep runs on this task, concurrent with the spawned minimal call.
        // Its result is held (not propagated) until minimal also finishes.
        let deep_result = if run_deep {
            Some(
                self.executor
                    .execute(&prompts::deep_system_prompt(), &prompt, schema::deep_schema())
                    .await,
            )
        } else {
            None
        };

        let minimal_result = minimal_task
            .await
            .map_err(|e| PipelineError::Extraction(format!("minimal extraction task: {e}")))?;

        let minimal_raw = minimal_result?;
        let minimal: MinimalExtraction =
            decode("minimal", evidence::sanitize(minimal_raw, &prompt))?;

        let deep = match deep_result {
            Some(result) => {
                let deep_raw = result?;
                Some(decode("deep", evidence::sanitize(deep_raw, &prompt))?)
            }
            None => None,
        };

        Ok(ExtractionOutcome { minimal, deep })
    }
}

/// Structural re-validation of a sanitized payload into its typed form.
fn decode<T: serde::de::DeserializeOwned>(
    stage: &str,
    payload: serde_json::Value,
) -> Result<T, PipelineError> {
    serde_json::from_value(payload)
        .map_err(|e| PipelineError::Extraction(format!("non-conforming {stage} payload: {e}")))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use super::*;
    use crate::config::ExtractorConfig;
    use crate::error::LlmError;
    use crate::llm::provider::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider};
    use crate::pipeline::types::DealStage;

    // ── Keyword heuristic ───────────────────────────────────────────

    fn make_email(subject: &str, body: &str) -> InboundEmail {
        InboundEmail {
            from: "brand@agency.com".into(),
            subject: subject.into(),
            received_at: None,
            body: body.into(),
            thread_id: None,
        }
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let email = make_email("Brand Partnership AGREEMENT", "details inside");
        assert!(has_attachment_keywords(&email));
    }

    #[test]
    fn keyword_matches_in_body() {
        let email = make_email("Next steps", "I've attached the statement of work for review.");
        assert!(has_attachment_keywords(&email));
    }

    #[test]
    fn keyword_io_requires_word_boundary() {
        let email = make_email("Quick question", "Excited about this collaboration opportunity!");
        assert!(!has_attachment_keywords(&email));

        let email = make_email("IO attached", "see the IO for terms");
        assert!(has_attachment_keywords(&email));
    }

    #[test]
    fn no_keywords_no_match() {
        let email = make_email("Hello", "Love your content, want to send you free samples?");
        assert!(!has_attachment_keywords(&email));
    }

    // ── Extraction flow ─────────────────────────────────────────────

    /// Scripted provider keyed on the request's schema name.
    struct ScriptedLlm {
        minimal_body: String,
        deep_body: Result<String, ()>,
        minimal_calls: AtomicU32,
        deep_calls: AtomicU32,
    }

    impl ScriptedLlm {
        fn new(minimal_body: &str, deep_body: &str) -> Self {
            Self {
                minimal_body: minimal_body.to_string(),
                deep_body: Ok(deep_body.to_string()),
                minimal_calls: AtomicU32::new(0),
                deep_calls: AtomicU32::new(0),
            }
        }

        fn with_failing_deep(minimal_body: &str) -> Self {
            Self {
                minimal_body: minimal_body.to_string(),
                deep_body: Err(()),
                minimal_calls: AtomicU32::new(0),
                deep_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        fn model_name(&self) -> &str {
            "mock-extraction"
        }

        fn cost_per_token(&self) -> (Decimal, Decimal) {
            (Decimal::ZERO, Decimal::ZERO)
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            let schema_name = request.response_schema.as_ref().map(|s| s.name);
            let content = match schema_name {
                Some("deal_minimal_extraction_v1") => {
                    self.minimal_calls.fetch_add(1, Ordering::SeqCst);
                    self.minimal_body.clone()
                }
                Some("deal_deep_extraction_v1") => {
                    self.deep_calls.fetch_add(1, Ordering::SeqCst);
                    match &self.deep_body {
                        Ok(body) => body.clone(),
                        Err(()) => {
                            return Err(LlmError::RequestFailed {
                                provider: "mock-extraction".into(),
                                reason: "HTTP 500".into(),
                            });
                        }
                    }
                }
                other => panic!("unexpected schema {other:?}"),
            };
            Ok(CompletionResponse {
                content,
                input_tokens: 200,
                output_tokens: 100,
                finish_reason: FinishReason::Stop,
            })
        }
    }

    /// Minimal payload whose only claim quotes "net-30" from the body.
    fn minimal_body() -> String {
        serde_json::json!({
            "campaignName": null,
            "brandName": null,
            "lastActionNeededBy": null,
            "draftRequired": null,
            "goLiveWindow": null,
            "payment": {
                "amount": 5000.0,
                "currency": "USD",
                "paymentTerms": "net-30",
                "evidence": {"quote": "net-30", "source": "EMAIL_BODY", "page": null},
            },
            "deliverablesSummary": null,
        })
        .to_string()
    }

    fn deep_body() -> String {
        serde_json::json!({
            "exclusivityRightsSummary": null,
            "usageRightsSummary": null,
            "payment": {
                "amount": 5000.0,
                "currency": "USD",
                "paymentTerms": "net-30",
                "paymentStatus": null,
                "invoiceSentAt": null,
                "invoiceExpectedAt": null,
                "evidence": {"quote": "$5,000", "source": "EMAIL_BODY", "page": null},
            },
            "keyDates": [],
            "requiredActions": [],
            "mustAvoids": [],
            "deliverables": [],
        })
        .to_string()
    }

    fn routing(stage: DealStage, parse_attachments: bool) -> Routing {
        Routing {
            is_deal: true,
            deal_stage: stage,
            should_parse_attachments: parse_attachments,
            routing_reason: None,
        }
    }

    fn engine(provider: Arc<ScriptedLlm>) -> ExtractionEngine {
        let executor = Arc::new(RequestExecutor::new(provider, &ExtractorConfig::default()));
        ExtractionEngine::new(executor)
    }

    #[tokio::test]
    async fn early_stage_without_signals_skips_deep() {
        let provider = Arc::new(ScriptedLlm::new(&minimal_body(), &deep_body()));
        let engine = engine(Arc::clone(&provider));

        let email = make_email("Collab?", "Paid $5,000 net-30 when the campaign wraps.");
        let outcome = engine
            .extract(&email, &routing(DealStage::Inbound, false))
            .await
            .unwrap();

        assert!(outcome.deep.is_none());
        assert_eq!(provider.minimal_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.deep_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn contracting_stage_always_runs_deep() {
        let provider = Arc::new(ScriptedLlm::new(&minimal_body(), &deep_body()));
        let engine = engine(Arc::clone(&provider));

        // No attachment hint, no keywords — the stage alone decides.
        let email = make_email("Next steps", "Paid $5,000 net-30 once we wrap.");
        let outcome = engine
            .extract(&email, &routing(DealStage::Contracting, false))
            .await
            .unwrap();

        assert!(outcome.deep.is_some());
        assert_eq!(provider.minimal_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.deep_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn attachment_hint_triggers_deep() {
        let provider = Arc::new(ScriptedLlm::new(&minimal_body(), &deep_body()));
        let engine = engine(Arc::clone(&provider));

        let email = make_email("Collab?", "Paid $5,000 net-30, details in the PDF.");
        let outcome = engine
            .extract(&email, &routing(DealStage::Inbound, true))
            .await
            .unwrap();

        assert!(outcome.deep.is_some());
        assert_eq!(provider.deep_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn keyword_heuristic_triggers_deep() {
        let provider = Arc::new(ScriptedLlm::new(&minimal_body(), &deep_body()));
        let engine = engine(Arc::clone(&provider));

        // Router said INBOUND with no attachment hint, but the text
        // mentions a contract.
        let email = make_email(
            "Brand Partnership Agreement",
            "Paid $5,000 net-30, see contract attached.",
        );
        let outcome = engine
            .extract(&email, &routing(DealStage::Inbound, false))
            .await
            .unwrap();

        assert!(outcome.deep.is_some());
        assert_eq!(provider.deep_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn deep_failure_fails_the_whole_stage() {
        let provider = Arc::new(ScriptedLlm::with_failing_deep(&minimal_body()));
        let engine = engine(Arc::clone(&provider));

        let email = make_email("Contract", "Paid $5,000 net-30, see contract attached.");
        let result = engine
            .extract(&email, &routing(DealStage::Contracting, false))
            .await;

        // No partial "minimal succeeded" outcome survives.
        assert!(result.is_err());
        assert_eq!(provider.minimal_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.deep_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn grounded_payment_survives_sanitization() {
        let provider = Arc::new(ScriptedLlm::new(&minimal_body(), &deep_body()));
        let engine = engine(provider);

        let email = make_email("Collab?", "Paid $5,000 net-30 when the campaign wraps.");
        let outcome = engine
            .extract(&email, &routing(DealStage::Inbound, false))
            .await
            .unwrap();

        let payment = outcome.minimal.payment.expect("payment should survive");
        assert_eq!(payment.payment_terms.as_deref(), Some("net-30"));
    }

    #[tokio::test]
    async fn ungrounded_claim_is_nulled_not_failed() {
        // The body never says "net-30", so the payment claim must vanish
        // while the call itself still succeeds.
        let provider = Arc::new(ScriptedLlm::new(&minimal_body(), &deep_body()));
        let engine = engine(provider);

        let email = make_email("Collab?", "We pay on delivery, full stop.");
        let outcome = engine
            .extract(&email, &routing(DealStage::Inbound, false))
            .await
            .unwrap();

        assert!(outcome.minimal.payment.is_none());
    }
}
