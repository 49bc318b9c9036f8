//! Background expiry sweeper
//!
//! Runs a sweep pass on a fixed interval. Pass failures are logged and the
//! loop keeps going; a broken database connection should not kill the
//! sweeper for the life of the process.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info};

use crate::service::EscrowService;

/// Default interval between sweep passes
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Run the expiry sweep forever.
///
/// Spawn this on its own task; it ticks immediately and then every
/// `interval`.
pub async fn run_sweeper(service: Arc<EscrowService>, interval: Duration) {
    info!(interval_secs = interval.as_secs(), "Expiry sweeper started");
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;
        debug!("Running expiry sweep");
        match service.sweep(Utc::now()).await {
            Ok(report) => {
                debug!(
                    cancelled = report.cancelled,
                    refunded = report.refunded,
                    failed = report.failed,
                    "Sweep pass complete"
                );
            }
            Err(e) => {
                error!(error = %e, "Sweep pass failed");
            }
        }
    }
}
