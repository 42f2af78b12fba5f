//! Background extraction worker — drains pending emails from a
//! `MessageSource`, routes each through `DealPipeline`, and hands results
//! to a `DealSink`.
//!
//! Timer-based loop:
//! 1. `fetch_pending()` from the source
//! 2. `pipeline.process()` per email
//! 3. `sink.save()` the assembled record
//! 4. `mark_processed()` on success

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::pipeline::processor::DealPipeline;
use crate::store::{DealRecord, DealSink, MessageSource};

/// Default processing interval: 5 minutes.
const DEFAULT_PROCESS_INTERVAL_SECS: u64 = 300;

/// Spawn a background task that processes pending emails through the
/// pipeline.
///
/// Returns a `JoinHandle` and shutdown flag.
pub fn spawn_extraction_worker(
    source: Arc<dyn MessageSource>,
    pipeline: Arc<DealPipeline>,
    sink: Arc<dyn DealSink>,
    interval_secs: Option<u64>,
) -> (JoinHandle<()>, Arc<AtomicBool>) {
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = Arc::clone(&shutdown);

    let interval = interval_secs.unwrap_or_else(|| {
        std::env::var("DEAL_ASSIST_PROCESS_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PROCESS_INTERVAL_SECS)
    });

    let handle = tokio::spawn(async move {
        info!("Extraction worker started — processing every {interval}s");

        let mut tick = tokio::time::interval(Duration::from_secs(interval));

        // Runs immediately on the first tick.
        loop {
            tick.tick().await;

            if shutdown.load(Ordering::Relaxed) {
                info!("Extraction worker shutting down");
                return;
            }

            drain_pending(&source, &pipeline, &sink).await;
        }
    });

    (handle, shutdown_flag)
}

/// Process all pending emails once.
///
/// Per-message failures are logged and the message is left pending for the
/// next tick; they never fail the batch.
pub async fn drain_pending(
    source: &Arc<dyn MessageSource>,
    pipeline: &Arc<DealPipeline>,
    sink: &Arc<dyn DealSink>,
) {
    let pending = match source.fetch_pending().await {
        Ok(emails) => emails,
        Err(e) => {
            error!("Failed to fetch pending emails: {e}");
            return;
        }
    };

    if pending.is_empty() {
        return;
    }

    info!("Processing {} pending email(s)", pending.len());

    for stored in pending {
        match pipeline.process(&stored.email).await {
            Ok(result) => {
                debug!(
                    id = %stored.id,
                    is_deal = result.routing.is_deal,
                    "Email processed successfully"
                );

                let record = DealRecord::new(stored.email, result);
                if let Err(e) = sink.save(&record).await {
                    warn!(id = %stored.id, error = %e, "Failed to persist deal record");
                    continue;
                }

                if let Err(e) = source.mark_processed(&stored.id).await {
                    warn!(id = %stored.id, error = %e, "Failed to mark email processed");
                }
            }
            Err(e) => {
                error!(id = %stored.id, error = %e, "Failed to process email");
                // Leave as pending — will be retried on next tick.
            }
        }
    }
}
