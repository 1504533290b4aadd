use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use super::BatteryMonitor;

/// Run the battery monitor as a background task.
///
/// The first check happens one full interval after startup. A check that
/// overruns its slot delays the next one instead of triggering a burst.
pub async fn run_battery_monitor<R: Rng + Send + 'static>(monitor: Arc<BatteryMonitor<R>>) {
    let config = monitor.config();
    let period = Duration::from_secs(config.interval_secs.max(1));

    info!(
        interval_secs = config.interval_secs,
        max_retries = config.max_retries,
        "Starting battery monitor"
    );

    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let report = monitor.run_with_retry().await;
        if report.is_complete() {
            info!(
                updated = report.updated.len(),
                skipped = report.skipped.len(),
                attempts = report.attempts,
                "Battery check finished"
            );
        } else {
            warn!(
                updated = report.updated.len(),
                failed = report.failed.len(),
                attempts = report.attempts,
                "Battery check finished with failures"
            );
        }
    }
}
