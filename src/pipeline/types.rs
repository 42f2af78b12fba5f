//! Data model for the deal extraction pipeline.
//!
//! Wire representation is camelCase keys with SCREAMING_SNAKE_CASE enum
//! literals — the storage collaborator consumes these shapes verbatim.
//! Every enum carries an `Other` sentinel so the model always has a
//! truthful fallback instead of being forced to invent a value.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ── Inbound message ─────────────────────────────────────────────────

/// Normalized email handed over by the retrieval collaborator.
///
/// Immutable for the duration of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEmail {
    /// Sender, as the raw From header value.
    pub from: String,
    /// Subject line.
    pub subject: String,
    /// When the message was received, if known.
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
    /// Plain-text body.
    pub body: String,
    /// Provider-side thread identifier.
    #[serde(default)]
    pub thread_id: Option<String>,
}

// ── Closed enumerations ─────────────────────────────────────────────

/// Lifecycle stage of a brand deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealStage {
    Inbound,
    Negotiation,
    Contracting,
    Scheduling,
    Fulfillment,
    Payment,
    Completed,
    Dead,
    Other,
}

impl DealStage {
    /// Literal wire values, in declaration order.
    pub const VALUES: &'static [&'static str] = &[
        "INBOUND",
        "NEGOTIATION",
        "CONTRACTING",
        "SCHEDULING",
        "FULFILLMENT",
        "PAYMENT",
        "COMPLETED",
        "DEAD",
        "OTHER",
    ];

    /// Late stages where contractual detail is likely enough to justify
    /// the deep extraction call.
    pub fn is_deep_eligible(self) -> bool {
        matches!(
            self,
            Self::Contracting
                | Self::Scheduling
                | Self::Fulfillment
                | Self::Payment
                | Self::Completed
        )
    }
}

/// Who must act next on the deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LastActionNeededBy {
    Creator,
    Brand,
    Agent,
    Platform,
    Other,
}

impl LastActionNeededBy {
    pub const VALUES: &'static [&'static str] =
        &["CREATOR", "BRAND", "AGENT", "PLATFORM", "OTHER"];
}

/// Payment currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Cad,
    Aud,
    Other,
}

impl Currency {
    pub const VALUES: &'static [&'static str] = &["USD", "EUR", "GBP", "CAD", "AUD", "OTHER"];
}

/// Invoice/payment state, only when explicitly stated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    NotApplicable,
    NotInvoiced,
    InvoiceRequested,
    InvoiceSent,
    Paid,
    Overdue,
    Unknown,
    Other,
}

impl PaymentStatus {
    pub const VALUES: &'static [&'static str] = &[
        "NOT_APPLICABLE",
        "NOT_INVOICED",
        "INVOICE_REQUESTED",
        "INVOICE_SENT",
        "PAID",
        "OVERDUE",
        "UNKNOWN",
        "OTHER",
    ];
}

/// Social platform a deliverable targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    Instagram,
    Tiktok,
    Youtube,
    Twitch,
    X,
    Pinterest,
    Facebook,
    Blog,
    Podcast,
    Other,
}

impl Platform {
    pub const VALUES: &'static [&'static str] = &[
        "INSTAGRAM",
        "TIKTOK",
        "YOUTUBE",
        "TWITCH",
        "X",
        "PINTEREST",
        "FACEBOOK",
        "BLOG",
        "PODCAST",
        "OTHER",
    ];
}

/// Content format of a deliverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliverableType {
    Post,
    Reel,
    Story,
    Tiktok,
    Short,
    Video,
    Livestream,
    Carousel,
    Thread,
    BlogPost,
    PodcastEpisode,
    Other,
}

impl DeliverableType {
    pub const VALUES: &'static [&'static str] = &[
        "POST",
        "REEL",
        "STORY",
        "TIKTOK",
        "SHORT",
        "VIDEO",
        "LIVESTREAM",
        "CAROUSEL",
        "THREAD",
        "BLOG_POST",
        "PODCAST_EPISODE",
        "OTHER",
    ];
}

/// Where an evidence quote was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceSource {
    EmailSubject,
    EmailFrom,
    EmailBody,
    PdfText,
    Other,
}

impl EvidenceSource {
    pub const VALUES: &'static [&'static str] = &[
        "EMAIL_SUBJECT",
        "EMAIL_FROM",
        "EMAIL_BODY",
        "PDF_TEXT",
        "OTHER",
    ];
}

// ── Evidence ────────────────────────────────────────────────────────

/// A literal quote proving an extracted value appears in the source text.
///
/// `quote` must be an exact, case-sensitive substring of the text the model
/// was shown for that call. `page` is only meaningful for `PDF_TEXT`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub quote: String,
    pub source: EvidenceSource,
    pub page: Option<u32>,
}

/// A value paired with its grounding evidence.
///
/// Always used as `Option<Evidenced<V>>`: a wrapper whose evidence fails
/// grounding collapses to `None` as a unit — partial trust is not permitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidenced<V> {
    pub value: V,
    pub evidence: Evidence,
}

// ── Routing (stage 1) ───────────────────────────────────────────────

/// Cheap first-pass classification. No evidence requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routing {
    pub is_deal: bool,
    pub deal_stage: DealStage,
    pub should_parse_attachments: bool,
    pub routing_reason: Option<String>,
}

// ── Minimal extraction (stage 2, always) ────────────────────────────

/// Go-live window: raw wording plus dates only when explicitly stated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoLiveWindow {
    pub raw_text: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub evidence: Evidence,
}

/// Payment terms at minimal depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub amount: Option<f64>,
    pub currency: Currency,
    pub payment_terms: Option<String>,
    pub evidence: Evidence,
}

/// Inbox-card payload — cheap, always extracted for deal emails.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimalExtraction {
    pub campaign_name: Option<Evidenced<String>>,
    pub brand_name: Option<Evidenced<String>>,
    pub last_action_needed_by: Option<Evidenced<LastActionNeededBy>>,
    pub draft_required: Option<Evidenced<bool>>,
    pub go_live_window: Option<GoLiveWindow>,
    pub payment: Option<PaymentInfo>,
    pub deliverables_summary: Option<Evidenced<String>>,
}

// ── Deep extraction (stage 2, conditional) ──────────────────────────

/// Payment terms at contract depth, with invoice lifecycle fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepPayment {
    pub amount: Option<f64>,
    pub currency: Currency,
    pub payment_terms: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub invoice_sent_at: Option<NaiveDate>,
    pub invoice_expected_at: Option<NaiveDate>,
    pub evidence: Evidence,
}

/// A named milestone with its raw wording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDate {
    pub name: Option<String>,
    pub date_raw_text: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub evidence: Evidence,
}

/// A contractual obligation (requiredActions) or prohibition (mustAvoids).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub name: String,
    pub description: Option<String>,
    pub evidence: Evidence,
}

/// A structured deliverable commitment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deliverable {
    pub platform: Platform,
    #[serde(rename = "type")]
    pub kind: DeliverableType,
    pub quantity: Option<u32>,
    pub due_date: Option<NaiveDate>,
    pub due_date_raw_text: Option<String>,
    pub description: Option<String>,
    pub evidence: Evidence,
}

/// Contract-level terms — only extracted for late-stage/contractual email.
///
/// `payment` is required by the output schema but may still be nulled by
/// grounding validation, hence the `Option`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepExtraction {
    pub exclusivity_rights_summary: Option<Evidenced<String>>,
    pub usage_rights_summary: Option<Evidenced<String>>,
    pub payment: Option<DeepPayment>,
    pub key_dates: Vec<KeyDate>,
    pub required_actions: Vec<ActionItem>,
    pub must_avoids: Vec<ActionItem>,
    pub deliverables: Vec<Deliverable>,
}

// ── Assembled result ────────────────────────────────────────────────

/// Output of one pipeline run, handed to the persistence collaborator.
///
/// `minimal`/`deep` are absent when routing said this is not a deal;
/// `deep` is additionally absent when the deep-eligibility test failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionTreeResult {
    pub routing: Routing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimal: Option<MinimalExtraction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deep: Option<DeepExtraction>,
}
