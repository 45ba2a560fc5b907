//! # Branchsync Engine
//!
//! The replication core of a branchsync node.
//!
//! Every node keeps a local replica of an employee registry together with an
//! append-only history log, and periodically pulls full snapshots from its
//! peers. This crate holds the logic that decides what a remote snapshot does
//! to local state, with the guarantee that the same inputs always produce the
//! same outputs.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine never reads a clock, a socket or a file; callers
//!   pass the current [`Timestamp`] in
//! - **Idempotent**: merging the same snapshot twice changes nothing the
//!   second time
//! - **Staged**: every write is planned as a [`ChangeSet`] first and applied
//!   second, so persistence layers can commit before memory changes
//!
//! ## Core Concepts
//!
//! ### Employees
//!
//! An [`Employee`] is identified by a natural key (a national identifier) and
//! carries mutable fields plus the node it originated from and the time of its
//! last accepted change.
//!
//! ### History
//!
//! A [`HistoryEntry`] is an immutable fact: a `read`, `write` or `update` of an
//! employee at a second-resolution timestamp on a given node. The whole
//! 4-tuple is the entry's identity; the store never holds two equal entries.
//!
//! ### Merge
//!
//! The [`Resolver`] compares each remote employee against the local replica:
//! - absent locally: inserted verbatim
//! - present locally: overwritten only if the remote `lastModified` is strictly
//!   newer than the local one (last-write-wins, local wins ties)
//!
//! Remote history entries are appended unless already present.
//!
//! ## Quick Start
//!
//! ```rust
//! use branchsync_engine::{EmployeeFields, Store, Timestamp};
//!
//! let now = Timestamp::parse("2024-01-01 10:00:00").unwrap();
//!
//! let mut a = Store::new("Sucursal_5000");
//! a.create("12345678", EmployeeFields::new("Ana", "Gomez", "Clerk"), &now).unwrap();
//!
//! let mut b = Store::new("Sucursal_5001");
//! let stats = b.merge(&a.snapshot(), &now);
//!
//! assert_eq!(stats.employee_inserts, 1);
//! assert_eq!(stats.history_inserts, 1);
//! assert_eq!(b.get("12345678").unwrap().first_name, "Ana");
//!
//! // Merging again is a no-op.
//! assert!(b.merge(&a.snapshot(), &now).is_noop());
//! ```

pub mod error;
pub mod history;
pub mod reconcile;
pub mod record;
pub mod snapshot;
pub mod store;
pub mod timestamp;

// Re-export main types at crate root
pub use error::Error;
pub use history::{HistoryEntry, HistoryKind, LoggedEntry};
pub use reconcile::{remote_is_newer, Decision, MergeStats, Resolver};
pub use record::{Employee, EmployeeFields};
pub use snapshot::Snapshot;
pub use store::{ChangeSet, Store};
pub use timestamp::{Timestamp, TIMESTAMP_FORMAT};

/// Type aliases for clarity
pub type EmployeeId = String;
pub type NodeName = String;
pub type Sequence = u64;
