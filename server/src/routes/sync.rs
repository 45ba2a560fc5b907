//! Snapshot and sync control routes.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use branchsync_engine::Snapshot;

use crate::error::{AppError, Result};
use crate::handlers::{SyncFromQuery, SyncStarted};
use crate::sync::SyncStatus;
use crate::AppState;

/// Create sync routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/snapshot", get(snapshot_handler))
        .route("/sync/now", post(sync_now_handler))
        .route("/sync/port/{port}", post(sync_port_handler))
        .route("/sync/from", post(sync_from_handler))
        .route("/sync/status", get(status_handler))
}

/// GET /snapshot - Full state, pulled by peers.
async fn snapshot_handler(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.node.replica().snapshot().await)
}

/// POST /sync/now - Start a cycle over every peer.
async fn sync_now_handler(State(state): State<AppState>) -> Json<SyncStarted> {
    Json(SyncStarted::new(state.coordinator.trigger_all()))
}

/// POST /sync/port/{port} - Start a cycle over the peers on `port`.
async fn sync_port_handler(
    State(state): State<AppState>,
    Path(port): Path<u16>,
) -> Json<SyncStarted> {
    let (started, targets) = state.coordinator.trigger_cohort(port);
    Json(SyncStarted {
        targets: Some(targets),
        ..SyncStarted::new(started)
    })
}

/// POST /sync/from?peer=HOST:PORT - Start a cycle against one peer.
async fn sync_from_handler(
    State(state): State<AppState>,
    Query(query): Query<SyncFromQuery>,
) -> Result<Json<SyncStarted>> {
    let peer = query
        .peer
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("missing peer".to_string()))?;

    let started = state.coordinator.trigger_peer(&peer);
    Ok(Json(SyncStarted {
        peer: Some(peer),
        ..SyncStarted::new(started)
    }))
}

/// GET /sync/status - Whether a cycle is running and when the last one ended.
async fn status_handler(State(state): State<AppState>) -> Json<SyncStatus> {
    Json(state.coordinator.status())
}
