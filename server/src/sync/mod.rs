//! Pull-based replication: peer fetching, sync cycles, the single-flight
//! coordinator and the periodic scheduler.

mod client;
mod coordinator;
mod orchestrator;
mod peers;
mod scheduler;

pub use client::{PeerClient, PeerError};
pub use coordinator::{SyncCoordinator, SyncStatus};
pub use orchestrator::{CycleStats, Orchestrator};
pub use peers::{port_of, PeerSet};
pub use scheduler::spawn_scheduler;
