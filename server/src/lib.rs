//! branchsync node - pull-based replication of an employee registry and its
//! history log between peer branches.
//!
//! Every node exposes its full state at `GET /snapshot` and periodically
//! pulls the same from its peers, merging with last-writer-wins on records
//! and set union on history. See `branchsync_engine` for the merge rules.

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod node;
pub mod replica;
pub mod routes;
pub mod sync;

use crate::clock::Clock;
use crate::config::Config;
use crate::db::Pool;
use crate::node::Node;
use crate::replica::Replica;
use crate::sync::{Orchestrator, PeerClient, SyncCoordinator};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub node: Arc<Node>,
    pub coordinator: Arc<SyncCoordinator>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Load the replica from `pool` and wire up the sync machinery.
    pub async fn new(config: Config, pool: Pool, clock: Arc<dyn Clock>) -> error::Result<Self> {
        let replica = Arc::new(Replica::open(pool, &config.node_name, clock.clone()).await?);
        let client = PeerClient::new(config.peer_timeout)?;

        let coordinator = Arc::new(SyncCoordinator::new(
            Orchestrator::new(replica.clone(), client),
            config.peer_set(),
            clock,
            config.sync_interval,
        ));
        let node = Arc::new(Node::new(replica, coordinator.clone(), config.auto_sync));

        Ok(Self {
            node,
            coordinator,
            config: Arc::new(config),
        })
    }
}

/// Build the HTTP router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
