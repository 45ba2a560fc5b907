//! History entries: the replicated, append-only log of operations.
//!
//! Every local create, update and read produces one entry. Entries are facts:
//! they are never edited or removed, and two entries that agree on all four
//! fields describe the same event.

use crate::{EmployeeId, NodeName, Sequence, Timestamp};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// What happened to the employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Read,
    Write,
    Update,
}

impl HistoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryKind::Read => "read",
            HistoryKind::Write => "write",
            HistoryKind::Update => "update",
        }
    }
}

impl fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(HistoryKind::Read),
            "write" => Ok(HistoryKind::Write),
            "update" => Ok(HistoryKind::Update),
            other => Err(format!("unknown history kind: {}", other)),
        }
    }
}

/// One replicated fact.
///
/// Equality and hashing cover all four fields, which together form the
/// deduplication key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub kind: HistoryKind,
    pub employee_id: EmployeeId,
    pub timestamp: Timestamp,
    pub origin_node: NodeName,
}

impl HistoryEntry {
    pub fn new(
        kind: HistoryKind,
        employee_id: impl Into<EmployeeId>,
        timestamp: Timestamp,
        origin_node: impl Into<NodeName>,
    ) -> Self {
        Self {
            kind,
            employee_id: employee_id.into(),
            timestamp,
            origin_node: origin_node.into(),
        }
    }
}

/// A history entry as stored on this node, tagged with its local insertion
/// sequence.
///
/// The sequence is node-local and never leaves the node; it only breaks ties
/// between entries with equal timestamps when listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedEntry {
    pub seq: Sequence,
    #[serde(flatten)]
    pub entry: HistoryEntry,
}

impl LoggedEntry {
    pub fn new(seq: Sequence, entry: HistoryEntry) -> Self {
        Self { seq, entry }
    }

    /// Listing order: newest timestamp first, then latest insertion first.
    pub fn listing_order(a: &LoggedEntry, b: &LoggedEntry) -> Ordering {
        b.entry
            .timestamp
            .cmp(&a.entry.timestamp)
            .then_with(|| b.seq.cmp(&a.seq))
    }
}
