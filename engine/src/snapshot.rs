//! Snapshots: the unit of exchange between nodes.
//!
//! A snapshot is a full, self-consistent export of one node's registry and
//! history, plus the per-employee last-modified signal derived from that
//! history. Ordered maps keep serialization deterministic.

use crate::{error::Result, Employee, EmployeeId, Error, HistoryEntry, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A point-in-time export of a node's state.
///
/// Every section defaults to empty when missing, so snapshots from peers that
/// predate `lastModified` still decode. Without a remote signal the merge keeps
/// local copies of employees that already exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Employees keyed by id
    #[serde(default)]
    pub employees: BTreeMap<EmployeeId, Employee>,
    /// History entries, newest first
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// Latest history timestamp per employee id
    #[serde(default)]
    pub last_modified: BTreeMap<EmployeeId, Timestamp>,
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an employee, keyed by its id.
    pub fn add_employee(&mut self, employee: Employee) {
        self.employees.insert(employee.id.clone(), employee);
    }

    /// Add a history entry and fold it into `last_modified`.
    pub fn add_history(&mut self, entry: HistoryEntry) {
        let slot = self
            .last_modified
            .entry(entry.employee_id.clone())
            .or_insert_with(|| entry.timestamp.clone());
        if entry.timestamp > *slot {
            *slot = entry.timestamp.clone();
        }
        self.history.push(entry);
    }

    pub fn employee_count(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty() && self.history.is_empty()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EmployeeFields, HistoryKind};

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn empty_snapshot() {
        let snapshot = Snapshot::new();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.employee_count(), 0);
        assert_eq!(
            snapshot.to_json().unwrap(),
            r#"{"employees":{},"history":[],"lastModified":{}}"#
        );
    }

    #[test]
    fn add_history_tracks_latest_timestamp() {
        let mut snapshot = Snapshot::new();
        for t in ["2024-01-01 10:00:00", "2024-01-01 12:00:00", "2024-01-01 11:00:00"] {
            snapshot.add_history(HistoryEntry::new(HistoryKind::Read, "1", ts(t), "n"));
        }
        assert_eq!(snapshot.history.len(), 3);
        assert_eq!(snapshot.last_modified["1"], ts("2024-01-01 12:00:00"));
    }

    #[test]
    fn decodes_peer_payload() {
        let json = r#"{
            "employees": {
                "12345678": {
                    "id": "12345678",
                    "firstName": "Ana",
                    "lastName": "Gomez",
                    "role": "Clerk",
                    "originNode": "Sucursal_5000"
                }
            },
            "history": [
                {"kind": "write", "employeeId": "12345678",
                 "timestamp": "2024-01-01 10:00:00", "originNode": "Sucursal_5000"}
            ],
            "lastModified": {"12345678": "2024-01-01 10:00:00"}
        }"#;

        let snapshot = Snapshot::from_json(json).unwrap();
        assert_eq!(snapshot.employee_count(), 1);
        assert_eq!(snapshot.history[0].kind, HistoryKind::Write);
        assert_eq!(
            snapshot.last_modified.get("12345678"),
            Some(&ts("2024-01-01 10:00:00"))
        );
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let snapshot = Snapshot::from_json(r#"{"employees": {}}"#).unwrap();
        assert!(snapshot.history.is_empty());
        assert!(snapshot.last_modified.is_empty());
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        for bad in [
            "not json",
            r#"{"employees": []}"#,
            r#"{"history": [{"kind": "delete", "employeeId": "1",
                "timestamp": "2024-01-01 10:00:00", "originNode": "n"}]}"#,
            r#"{"lastModified": {"1": "yesterday"}}"#,
        ] {
            assert!(
                matches!(Snapshot::from_json(bad), Err(Error::InvalidSnapshot(_))),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn serialization_is_deterministic() {
        let mut a = Snapshot::new();
        let mut b = Snapshot::new();
        let e1 = Employee::new("1", EmployeeFields::new("A", "B", "C"), "n", ts("2024-01-01 10:00:00"));
        let e2 = Employee::new("2", EmployeeFields::new("D", "E", "F"), "n", ts("2024-01-01 10:00:00"));

        a.add_employee(e1.clone());
        a.add_employee(e2.clone());
        b.add_employee(e2);
        b.add_employee(e1);

        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    }
}
