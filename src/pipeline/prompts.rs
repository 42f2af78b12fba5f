//! Prompt construction for the three pipeline stages.
//!
//! Both renderers are deterministic pure functions of the message. The
//! rendered string is exactly what the grounding validator later scans, so
//! the metadata/body delimiter tags are part of the searchable text and
//! evidence quotes must come from inside the content itself.

use crate::pipeline::types::InboundEmail;

// ── System prompts ──────────────────────────────────────────────────

const SHARED_RULES: &str = "OUTPUT RULES:\n\
     - Output JSON only.\n\
     - No prose, no explanations.\n\
     - Prefer null/empty arrays over guessing.\n\
     - For every non-null extracted field or array item, include evidence.\n\
     - Evidence.quote MUST be an exact substring from the provided input text.\n\
     - Keep summaries brief; do not paraphrase long legal text.";

/// Stage-1 routing: classify only, no extraction.
pub fn routing_system_prompt() -> String {
    format!(
        "Router: routing only (no extraction).\n\
         Decide if this email is a brand deal or brand-deal related, and what stage it is at.\n\
         Also decide whether attachments likely contain deal terms (contract/brief/SOW) worth parsing.\n\
         \n\
         {SHARED_RULES}"
    )
}

/// Stage-2 minimal: the early-stage inbox-card payload.
pub fn minimal_system_prompt() -> String {
    format!(
        "Extractor: minimal inbox card payload (early-stage).\n\
         Extract ONLY:\n\
         - campaignName\n\
         - brandName\n\
         - lastActionNeededBy\n\
         - draftRequired (only if explicitly stated)\n\
         - goLiveWindow (rawText; start/end date only if explicitly stated)\n\
         - payment (amount/currency; paymentTerms only if explicitly short + explicit, e.g. 'Net 30')\n\
         - deliverablesSummary\n\
         \n\
         Do NOT extract legal terms, usage rights, exclusivity, invoice timestamps, or structured deliverables here.\n\
         \n\
         {SHARED_RULES}"
    )
}

/// Stage-2 deep: contract-level terms.
pub fn deep_system_prompt() -> String {
    format!(
        "Extractor: deep terms (late-stage / contract / brief / SOW).\n\
         Extract ONLY:\n\
         - exclusivityRightsSummary (brief, if any)\n\
         - usageRightsSummary (brief, if any)\n\
         - payment terms + payment status + invoice timestamps (ONLY if explicitly stated)\n\
         - keyDates (named milestones) if explicitly stated\n\
         - requiredActions and mustAvoids if explicitly stated\n\
         - deliverables (structured) ONLY if explicitly stated\n\
         \n\
         Rules:\n\
         - Never infer; return null/empty if unclear.\n\
         - Evidence required for every field and item.\n\
         \n\
         {SHARED_RULES}"
    )
}

// ── User prompt renderers ───────────────────────────────────────────

/// Short form for the cheap routing call: From/Subject metadata plus the
/// body truncated to `max_body_chars` characters.
pub fn snippet_prompt(email: &InboundEmail, max_body_chars: usize) -> String {
    let body_snippet: String = email.body.chars().take(max_body_chars).collect();
    format!(
        "<EMAIL_METADATA>\n\
         From: {}\n\
         Subject: {}\n\
         </EMAIL_METADATA>\n\
         \n\
         <EMAIL_BODY_SNIPPET>\n\
         {}\n\
         </EMAIL_BODY_SNIPPET>",
        email.from, email.subject, body_snippet
    )
}

/// Full form for extraction calls: complete metadata and untruncated body.
pub fn full_prompt(email: &InboundEmail) -> String {
    let received_at = email
        .received_at
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
    format!(
        "Extract campaign data according to the output schema.\n\
         Prefer the newest reply content; ignore outdated quoted text.\n\
         \n\
         <EMAIL_METADATA>\n\
         From: {}\n\
         Subject: {}\n\
         ReceivedAt: {}\n\
         </EMAIL_METADATA>\n\
         \n\
         <EMAIL_BODY>\n\
         {}\n\
         </EMAIL_BODY>",
        email.from, email.subject, received_at, email.body
    )
}
