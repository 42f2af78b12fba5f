//! Collaborator seams — message retrieval and record persistence.
//!
//! The pipeline owns no durable state. It receives normalized emails from a
//! `MessageSource` and hands immutable `DealRecord`s to a `DealSink`; both
//! sides are narrow traits so the real providers (mail API, database) stay
//! out of the extraction logic.

pub mod local;

pub use local::JsonFileSink;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::pipeline::types::{DecisionTreeResult, InboundEmail};

/// Persistence envelope for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub email: InboundEmail,
    pub result: DecisionTreeResult,
}

impl DealRecord {
    pub fn new(email: InboundEmail, result: DecisionTreeResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            email,
            result,
        }
    }
}

/// A pending email with the source-side id used for acknowledgement.
#[derive(Debug, Clone)]
pub struct StoredEmail {
    pub id: String,
    pub email: InboundEmail,
}

/// Where pending emails come from.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Fetch emails awaiting extraction.
    async fn fetch_pending(&self) -> Result<Vec<StoredEmail>, StoreError>;

    /// Acknowledge a successfully processed email.
    async fn mark_processed(&self, id: &str) -> Result<(), StoreError>;
}

/// Where assembled records go.
#[async_trait]
pub trait DealSink: Send + Sync {
    /// Persist one record.
    async fn save(&self, record: &DealRecord) -> Result<(), StoreError>;
}
