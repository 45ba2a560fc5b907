//! One sync cycle: pull every target peer once and merge what it has.

use super::client::PeerClient;
use crate::replica::Replica;
use branchsync_engine::MergeStats;
use serde::Serialize;
use std::sync::Arc;

/// Aggregated outcome of a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleStats {
    pub peers_ok: usize,
    pub peers_failed: usize,
    pub merged_employees: usize,
    pub merged_history: usize,
}

impl CycleStats {
    fn record_merge(&mut self, stats: &MergeStats) {
        self.peers_ok += 1;
        self.merged_employees += stats.merged_employees();
        self.merged_history += stats.history_inserts;
    }
}

/// Runs sync cycles against a replica.
pub struct Orchestrator {
    replica: Arc<Replica>,
    client: PeerClient,
}

impl Orchestrator {
    pub fn new(replica: Arc<Replica>, client: PeerClient) -> Self {
        Self { replica, client }
    }

    /// Attempt each peer once, in order.
    ///
    /// A failing peer is logged and counted; it never aborts the cycle.
    pub async fn run_cycle(&self, peers: &[String]) -> CycleStats {
        let mut stats = CycleStats::default();

        tracing::info!(peers = peers.len(), "sync cycle started");

        for peer in peers {
            let snapshot = match self.client.fetch_snapshot(peer).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!(peer = %peer, error = %e, "peer fetch failed");
                    stats.peers_failed += 1;
                    continue;
                }
            };

            match self.replica.merge(&snapshot).await {
                Ok(merged) => {
                    tracing::debug!(
                        peer = %peer,
                        employees = snapshot.employee_count(),
                        history = snapshot.history.len(),
                        "peer ok"
                    );
                    stats.record_merge(&merged);
                }
                Err(e) => {
                    tracing::error!(peer = %peer, error = %e, "merge failed");
                    stats.peers_failed += 1;
                }
            }
        }

        tracing::info!(
            peers_ok = stats.peers_ok,
            peers_failed = stats.peers_failed,
            merged_employees = stats.merged_employees,
            merged_history = stats.merged_history,
            "sync cycle finished"
        );

        stats
    }
}
