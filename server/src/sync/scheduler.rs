//! Periodic background sync.

use super::coordinator::SyncCoordinator;
use crate::config::SyncScope;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Spawn the scheduler loop. Returns `None` when `interval_secs <= 0`.
///
/// Each tick goes through the same single-flight guard as every other
/// trigger, so a tick that lands on a running cycle is skipped.
pub fn spawn_scheduler(
    coordinator: Arc<SyncCoordinator>,
    interval_secs: i64,
    scope: SyncScope,
    port: u16,
) -> Option<JoinHandle<()>> {
    if interval_secs <= 0 {
        tracing::info!("scheduler disabled");
        return None;
    }

    let period = Duration::from_secs(interval_secs.unsigned_abs());
    tracing::info!(interval_secs, scope = %scope, "scheduler started");

    Some(tokio::spawn(async move {
        loop {
            tokio::time::sleep(period).await;

            let targets = match scope {
                SyncScope::All => coordinator.peers().all(),
                SyncScope::Cohort => coordinator.peers().cohort(port),
            };
            tracing::debug!(targets = targets.len(), "scheduler tick");

            coordinator.run_now(&targets).await;
        }
    }))
}
