//! Reconciliation of a remote snapshot into the local replica.
//!
//! # Algorithm
//!
//! For every employee in the remote snapshot:
//!
//! 1. Absent locally: insert the remote copy as is
//! 2. Present locally: compare the remote `lastModified` for that id with the
//!    local one. The remote copy wins only if it has a signal and that signal
//!    is strictly greater than the local one (or the local one is missing).
//!    The winner's mutable fields overwrite the local record and `updatedAt`
//!    moves to the merge time. Ties and missing remote signals keep the local
//!    copy.
//!
//! Then every remote history entry that is not already stored (by its full
//! 4-tuple) is appended. Nothing is ever removed.
//!
//! Timestamps compare as fixed-width strings, so this is last-write-wins by
//! wall clock. A node whose clock runs ahead will win conflicts it should not;
//! that is accepted behaviour, not something the resolver tries to correct.

use crate::{ChangeSet, Employee, HistoryEntry, LoggedEntry, Snapshot, Store, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Counts produced by one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeStats {
    /// Employees that did not exist locally
    pub employee_inserts: usize,
    /// Existing employees overwritten by a newer remote copy
    pub employee_updates: usize,
    /// History entries that were new to this node
    pub history_inserts: usize,
}

impl MergeStats {
    /// Inserted plus updated employees.
    pub fn merged_employees(&self) -> usize {
        self.employee_inserts + self.employee_updates
    }

    /// True when the merge changed nothing.
    pub fn is_noop(&self) -> bool {
        self.merged_employees() == 0 && self.history_inserts == 0
    }
}

impl std::ops::AddAssign for MergeStats {
    fn add_assign(&mut self, other: Self) {
        self.employee_inserts += other.employee_inserts;
        self.employee_updates += other.employee_updates;
        self.history_inserts += other.history_inserts;
    }
}

/// What the resolver does with one remote employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Insert,
    Update,
    Skip,
}

/// Last-write-wins comparison of recency signals.
///
/// The remote side wins only with a signal of its own, and then only if the
/// local side has none or an older one. Equal signals keep the local copy.
pub fn remote_is_newer(remote: Option<&Timestamp>, local: Option<&Timestamp>) -> bool {
    match (remote, local) {
        (Some(_), None) => true,
        (Some(remote), Some(local)) => remote > local,
        (None, _) => false,
    }
}

/// Plans the effect of one remote snapshot on a store.
pub struct Resolver<'a> {
    store: &'a Store,
    now: &'a Timestamp,
}

impl<'a> Resolver<'a> {
    /// Create a resolver that stamps accepted changes with `now`.
    pub fn new(store: &'a Store, now: &'a Timestamp) -> Self {
        Self { store, now }
    }

    /// Decide the fate of the remote employee stored under `id`.
    pub fn decide(&self, id: &str, remote: &Snapshot) -> Decision {
        if !self.store.contains(id) {
            return Decision::Insert;
        }

        let remote_ts = remote.last_modified.get(id);
        let local_ts = self.store.last_modified_of(id);
        if remote_is_newer(remote_ts, local_ts) {
            Decision::Update
        } else {
            Decision::Skip
        }
    }

    /// Plan the merge without touching the store.
    pub fn plan(self, remote: &Snapshot) -> (ChangeSet, MergeStats) {
        let mut changes = ChangeSet::new();
        let mut stats = MergeStats::default();

        for (id, remote_employee) in &remote.employees {
            match self.decide(id, remote) {
                Decision::Insert => {
                    changes.employees.push(self.inserted(id, remote_employee));
                    stats.employee_inserts += 1;
                }
                Decision::Update => {
                    if let Some(local) = self.store.get(id) {
                        let mut updated = local.clone();
                        updated.adopt(remote_employee, self.now);
                        changes.employees.push(updated);
                        stats.employee_updates += 1;
                    }
                }
                Decision::Skip => {}
            }
        }

        let mut batch: HashSet<&HistoryEntry> = HashSet::new();
        let mut seq = self.store.next_seq();
        for entry in &remote.history {
            if self.store.has_entry(entry) || !batch.insert(entry) {
                continue;
            }
            changes.history.push(LoggedEntry::new(seq, entry.clone()));
            seq += 1;
            stats.history_inserts += 1;
        }

        (changes, stats)
    }

    fn inserted(&self, id: &str, remote: &Employee) -> Employee {
        let mut employee = remote.clone();
        // The map key is authoritative for identity.
        employee.id = id.to_string();
        if employee.updated_at.is_none() {
            employee.updated_at = Some(self.now.clone());
        }
        employee
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EmployeeFields, HistoryKind};

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn store_with(node: &str, id: &str, role: &str, at: &str) -> Store {
        let mut store = Store::new(node);
        store
            .create(id, EmployeeFields::new("Ana", "Gomez", role), &ts(at))
            .unwrap();
        store
    }

    #[test]
    fn remote_is_newer_rules() {
        let early = ts("2024-01-01 09:00:00");
        let late = ts("2024-01-01 10:00:00");

        assert!(remote_is_newer(Some(&late), Some(&early)));
        assert!(!remote_is_newer(Some(&early), Some(&late)));
        assert!(!remote_is_newer(Some(&late), Some(&late)));
        assert!(remote_is_newer(Some(&early), None));
        assert!(!remote_is_newer(None, Some(&early)));
        assert!(!remote_is_newer(None, None));
    }

    #[test]
    fn inserts_missing_employee_verbatim() {
        let remote = store_with("A", "1", "Clerk", "2024-01-01 10:00:00");
        let mut local = Store::new("B");

        let stats = local.merge(&remote.snapshot(), &ts("2024-01-02 00:00:00"));
        assert_eq!(stats.employee_inserts, 1);
        assert_eq!(stats.history_inserts, 1);

        let e = local.get("1").unwrap();
        assert_eq!(e, remote.get("1").unwrap());
        assert_eq!(e.origin_node, "A");
    }

    #[test]
    fn newer_remote_overwrites_and_bumps_updated_at() {
        let mut local = store_with("B", "1", "Clerk", "2024-01-01 09:00:00");
        let mut remote = local.clone();
        remote
            .update(
                "1",
                EmployeeFields::new("Ana", "Gomez", "Manager"),
                &ts("2024-01-01 10:00:00"),
            )
            .unwrap();

        let merge_time = ts("2024-01-01 10:30:00");
        let stats = local.merge(&remote.snapshot(), &merge_time);
        assert_eq!(stats.employee_updates, 1);
        assert_eq!(stats.history_inserts, 1);

        let e = local.get("1").unwrap();
        assert_eq!(e.role, "Manager");
        assert_eq!(e.updated_at, Some(merge_time));
    }

    #[test]
    fn equal_signals_keep_local() {
        let mut local = store_with("A", "1", "Clerk", "2024-01-01 10:00:00");
        let remote = store_with("B", "1", "Manager", "2024-01-01 10:00:00");

        let stats = local.merge(&remote.snapshot(), &ts("2024-01-01 11:00:00"));
        assert_eq!(stats.employee_updates, 0);
        assert_eq!(stats.history_inserts, 1);
        assert_eq!(local.get("1").unwrap().role, "Clerk");
        assert_eq!(local.get("1").unwrap().origin_node, "A");
    }

    #[test]
    fn older_remote_is_skipped() {
        let mut local = store_with("A", "1", "Clerk", "2024-01-01 10:00:00");
        let remote = store_with("B", "1", "Manager", "2024-01-01 09:00:00");

        let resolver_store = local.clone();
        let remote_snapshot = remote.snapshot();
        let now = ts("2024-01-01 11:00:00");
        let resolver = Resolver::new(&resolver_store, &now);
        assert_eq!(resolver.decide("1", &remote_snapshot), Decision::Skip);

        local.merge(&remote_snapshot, &now);
        assert_eq!(local.get("1").unwrap().role, "Clerk");
    }

    #[test]
    fn missing_remote_signal_keeps_local() {
        let mut local = store_with("A", "1", "Clerk", "2024-01-01 10:00:00");
        let mut snapshot = store_with("B", "1", "Manager", "2030-01-01 00:00:00").snapshot();
        snapshot.last_modified.clear();

        let stats = local.merge(&snapshot, &ts("2024-01-01 11:00:00"));
        assert_eq!(stats.employee_updates, 0);
        assert_eq!(local.get("1").unwrap().role, "Clerk");
    }

    #[test]
    fn local_without_history_loses_to_any_signal() {
        let now = ts("2024-01-01 10:00:00");
        let mut local = Store::from_parts(
            "A",
            vec![Employee::new("1", EmployeeFields::new("Ana", "Gomez", "Clerk"), "A", now)],
            vec![],
        );
        let remote = store_with("B", "1", "Manager", "2020-01-01 00:00:00");

        let stats = local.merge(&remote.snapshot(), &ts("2024-01-01 11:00:00"));
        assert_eq!(stats.employee_updates, 1);
        assert_eq!(local.get("1").unwrap().role, "Manager");
    }

    #[test]
    fn duplicate_entries_within_one_snapshot_count_once() {
        let remote = store_with("A", "1", "Clerk", "2024-01-01 10:00:00");
        let mut snapshot = remote.snapshot();
        let dup = snapshot.history[0].clone();
        snapshot.history.push(dup);

        let mut local = Store::new("B");
        let stats = local.merge(&snapshot, &ts("2024-01-01 11:00:00"));
        assert_eq!(stats.history_inserts, 1);
        assert_eq!(local.history_len(), 1);
    }

    #[test]
    fn map_key_wins_over_embedded_id() {
        let remote = store_with("A", "1", "Clerk", "2024-01-01 10:00:00");
        let mut snapshot = remote.snapshot();
        let mut e = snapshot.employees.remove("1").unwrap();
        e.id = "other".into();
        snapshot.employees.insert("1".into(), e);

        let mut local = Store::new("B");
        local.merge(&snapshot, &ts("2024-01-01 11:00:00"));
        assert!(local.contains("1"));
        assert!(!local.contains("other"));
    }

    #[test]
    fn missing_updated_at_is_stamped_on_insert() {
        let remote = store_with("A", "1", "Clerk", "2024-01-01 10:00:00");
        let mut snapshot = remote.snapshot();
        if let Some(e) = snapshot.employees.get_mut("1") {
            e.updated_at = None;
        }

        let mut local = Store::new("B");
        let now = ts("2024-01-01 11:00:00");
        local.merge(&snapshot, &now);
        assert_eq!(local.get("1").unwrap().updated_at, Some(now));
    }

    #[test]
    fn merging_twice_is_a_noop() {
        let mut remote = store_with("A", "1", "Clerk", "2024-01-01 10:00:00");
        remote.read("1", &ts("2024-01-01 10:01:00")).unwrap();
        let snapshot = remote.snapshot();

        let mut local = Store::new("B");
        let now = ts("2024-01-01 11:00:00");
        let first = local.merge(&snapshot, &now);
        assert!(!first.is_noop());

        let employees_before: Vec<Employee> = local.employees().into_iter().cloned().collect();
        let second = local.merge(&snapshot, &ts("2024-01-01 12:00:00"));
        assert!(second.is_noop());
        assert_eq!(local.history_len(), 2);

        let employees_after: Vec<Employee> = local.employees().into_iter().cloned().collect();
        assert_eq!(employees_before, employees_after);
    }

    #[test]
    fn history_is_never_synthesized_by_merge() {
        let remote = store_with("A", "1", "Clerk", "2024-01-01 10:00:00");
        let mut local = Store::new("B");
        local.merge(&remote.snapshot(), &ts("2024-01-01 11:00:00"));

        assert!(local
            .history()
            .iter()
            .all(|l| l.entry.kind == HistoryKind::Write && l.entry.origin_node == "A"));
    }

    #[test]
    fn stats_accumulate() {
        let mut total = MergeStats::default();
        total += MergeStats {
            employee_inserts: 1,
            employee_updates: 2,
            history_inserts: 3,
        };
        total += MergeStats {
            employee_inserts: 1,
            employee_updates: 0,
            history_inserts: 1,
        };
        assert_eq!(total.merged_employees(), 4);
        assert_eq!(total.history_inserts, 4);
    }
}
