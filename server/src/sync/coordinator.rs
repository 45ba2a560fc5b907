//! Single-flight coordination of sync cycles.
//!
//! At most one cycle runs per process. A trigger that finds a cycle in
//! progress is rejected on the spot; it is never queued.

use super::orchestrator::{CycleStats, Orchestrator};
use super::peers::PeerSet;
use crate::clock::Clock;
use branchsync_engine::Timestamp;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Clears the running flag when dropped, including during unwinding.
#[derive(Debug)]
pub(crate) struct RunningGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Status exposed to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub syncing: bool,
    pub last_sync: Option<Timestamp>,
    pub interval: i64,
}

/// Process-wide sync state: the single-flight flag, the last completion
/// time and the orchestrator that does the work.
pub struct SyncCoordinator {
    orchestrator: Orchestrator,
    peers: PeerSet,
    clock: Arc<dyn Clock>,
    interval: i64,
    running: Arc<AtomicBool>,
    last_sync: Mutex<Option<Timestamp>>,
    last_stats: Mutex<Option<CycleStats>>,
}

impl SyncCoordinator {
    pub fn new(
        orchestrator: Orchestrator,
        peers: PeerSet,
        clock: Arc<dyn Clock>,
        interval: i64,
    ) -> Self {
        Self {
            orchestrator,
            peers,
            clock,
            interval,
            running: Arc::new(AtomicBool::new(false)),
            last_sync: Mutex::new(None),
            last_stats: Mutex::new(None),
        }
    }

    pub fn peers(&self) -> &PeerSet {
        &self.peers
    }

    /// Whether a cycle is in progress.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Idle -> Running, atomically. `None` if a cycle is already running.
    pub(crate) fn try_begin(&self) -> Option<RunningGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunningGuard {
                flag: Arc::clone(&self.running),
            })
    }

    /// Run a cycle on the current task, unless one is already running.
    pub async fn run_now(&self, targets: &[String]) -> Option<CycleStats> {
        let Some(guard) = self.try_begin() else {
            tracing::info!("sync already running");
            return None;
        };
        let stats = self.run_guarded(targets).await;
        drop(guard);
        Some(stats)
    }

    /// Start a cycle in a detached task. Returns whether it was started.
    pub fn trigger(self: &Arc<Self>, targets: Vec<String>) -> bool {
        let Some(guard) = self.try_begin() else {
            tracing::info!("sync already running");
            return false;
        };

        let this = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = guard;
            this.run_guarded(&targets).await;
        });
        true
    }

    /// Trigger over every peer.
    pub fn trigger_all(self: &Arc<Self>) -> bool {
        self.trigger(self.peers.all())
    }

    /// Trigger over the peers listening on `port`.
    pub fn trigger_cohort(self: &Arc<Self>, port: u16) -> (bool, Vec<String>) {
        let targets = self.peers.cohort(port);
        (self.trigger(targets.clone()), targets)
    }

    /// Trigger against one explicit peer address.
    pub fn trigger_peer(self: &Arc<Self>, peer: &str) -> bool {
        self.trigger(vec![peer.trim().to_string()])
    }

    async fn run_guarded(&self, targets: &[String]) -> CycleStats {
        let stats = self.orchestrator.run_cycle(targets).await;

        match self.clock.now() {
            Ok(now) => *lock(&self.last_sync) = Some(now),
            Err(e) => tracing::error!(error = %e, "could not stamp sync completion"),
        }
        *lock(&self.last_stats) = Some(stats);

        stats
    }

    /// Completion time of the last finished cycle.
    pub fn last_sync(&self) -> Option<Timestamp> {
        lock(&self.last_sync).clone()
    }

    /// Stats of the last finished cycle.
    pub fn last_stats(&self) -> Option<CycleStats> {
        *lock(&self.last_stats)
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            syncing: self.is_running(),
            last_sync: self.last_sync(),
            interval: self.interval,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
