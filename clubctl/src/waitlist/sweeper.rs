//! Background daemon running the capacity sweep on an interval.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::waitlist::CapacityChecker;

/// Run the capacity sweep until the shutdown token fires.
///
/// The first sweep happens one interval after startup, not immediately, so
/// restarts during an incident don't re-announce everything at once.
pub async fn run_capacity_sweeper(checker: CapacityChecker, interval: Duration, shutdown: CancellationToken) {
    tracing::info!(interval = ?interval, "Starting capacity sweeper");

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.cancelled() => {
                tracing::info!("Capacity sweeper shutting down");
                return;
            }
        }

        match checker.sweep().await {
            Ok(summary) => {
                if summary.notifications_sent > 0 || summary.offers_lapsed > 0 {
                    tracing::info!(
                        checked = summary.classes_checked,
                        notified = summary.notifications_sent,
                        lapsed = summary.offers_lapsed,
                        suppressed = summary.cooldown_suppressed,
                        "Capacity sweep finished"
                    );
                } else {
                    tracing::debug!(checked = summary.classes_checked, "Capacity sweep finished, nothing to do");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Capacity sweep failed");
            }
        }
    }
}
