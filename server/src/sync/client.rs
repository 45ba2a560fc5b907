//! HTTP client for fetching peer snapshots.

use branchsync_engine::Snapshot;
use reqwest::StatusCode;
use std::time::Duration;

/// Why a peer could not contribute to a cycle.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    #[error("peer unreachable: {0}")]
    Unreachable(String),

    #[error("peer answered with status {0}")]
    BadResponse(StatusCode),

    #[error("peer sent a malformed snapshot: {0}")]
    MalformedPayload(String),
}

/// Fetches `/snapshot` from peers with a bounded per-request timeout.
#[derive(Debug, Clone)]
pub struct PeerClient {
    http: reqwest::Client,
}

impl PeerClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Snapshot URL for a `host:port` address. Full URLs are used as given.
    pub fn snapshot_url(peer: &str) -> String {
        let base = peer.trim_end_matches('/');
        if base.starts_with("http://") || base.starts_with("https://") {
            format!("{}/snapshot", base)
        } else {
            format!("http://{}/snapshot", base)
        }
    }

    /// Fetch and decode a peer's full snapshot.
    pub async fn fetch_snapshot(&self, peer: &str) -> Result<Snapshot, PeerError> {
        let response = self
            .http
            .get(Self::snapshot_url(peer))
            .send()
            .await
            .map_err(|e| PeerError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PeerError::BadResponse(status));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PeerError::Unreachable(e.to_string()))?;

        Snapshot::from_json(&body).map_err(|e| PeerError::MalformedPayload(e.to_string()))
    }
}
