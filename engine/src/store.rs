//! Store - the in-memory replica of one node's registry and history.
//!
//! The Store is the keyed record store every write path goes through. It
//! holds the employees, the append-only history with its deduplication index,
//! and the last-modified signal derived from that history.
//!
//! Writes are two-phase. A `plan_*` method inspects the current state and
//! returns a [`ChangeSet`] without touching anything; [`Store::apply`] then
//! installs it and cannot fail. A caller that persists state commits the
//! change set to disk between the two steps, so memory only changes once the
//! disk has.

use crate::{
    error::Result, Employee, EmployeeFields, EmployeeId, Error, HistoryEntry, HistoryKind,
    LoggedEntry, MergeStats, NodeName, Resolver, Sequence, Snapshot, Timestamp,
};
use std::collections::{BTreeMap, HashMap, HashSet};

/// The writes produced by one planned operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Employee rows to insert or overwrite
    pub employees: Vec<Employee>,
    /// History entries to append, with their assigned sequence numbers
    pub history: Vec<LoggedEntry>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty() && self.history.is_empty()
    }
}

/// The local replica.
#[derive(Debug, Clone)]
pub struct Store {
    node: NodeName,
    employees: HashMap<EmployeeId, Employee>,
    history: Vec<LoggedEntry>,
    seen: HashSet<HistoryEntry>,
    last_modified: HashMap<EmployeeId, Timestamp>,
    next_seq: Sequence,
}

impl Store {
    /// Create an empty store for `node`.
    pub fn new(node: impl Into<NodeName>) -> Self {
        Self {
            node: node.into(),
            employees: HashMap::new(),
            history: Vec::new(),
            seen: HashSet::new(),
            last_modified: HashMap::new(),
            next_seq: 1,
        }
    }

    /// Rebuild a store from persisted rows.
    ///
    /// Duplicate history rows are dropped; the last-modified map is recomputed
    /// from history.
    pub fn from_parts(
        node: impl Into<NodeName>,
        employees: impl IntoIterator<Item = Employee>,
        history: impl IntoIterator<Item = LoggedEntry>,
    ) -> Self {
        let mut store = Self::new(node);
        for employee in employees {
            store.upsert(employee);
        }
        for logged in history {
            store.append_logged(logged);
        }
        store
    }

    /// Name of the node this replica belongs to.
    pub fn node(&self) -> &str {
        &self.node
    }

    // ------------------------------------------------------------------
    // Record store primitives
    // ------------------------------------------------------------------

    /// Get an employee by id.
    pub fn get(&self, id: &str) -> Option<&Employee> {
        self.employees.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.employees.contains_key(id)
    }

    /// Insert or overwrite an employee.
    pub fn upsert(&mut self, employee: Employee) {
        self.employees.insert(employee.id.clone(), employee);
    }

    /// Insert an employee unless the id is taken. Returns whether it was inserted.
    pub fn insert_if_absent(&mut self, employee: Employee) -> bool {
        if self.employees.contains_key(&employee.id) {
            return false;
        }
        self.upsert(employee);
        true
    }

    /// Append a history entry unless an equal one is stored.
    ///
    /// Returns the assigned sequence number, or `None` for a duplicate.
    pub fn append_if_absent(&mut self, entry: HistoryEntry) -> Option<Sequence> {
        if self.seen.contains(&entry) {
            return None;
        }
        let seq = self.next_seq;
        self.append_logged(LoggedEntry::new(seq, entry));
        Some(seq)
    }

    /// Whether an equal history entry is already stored.
    pub fn has_entry(&self, entry: &HistoryEntry) -> bool {
        self.seen.contains(entry)
    }

    fn append_logged(&mut self, logged: LoggedEntry) -> bool {
        if !self.seen.insert(logged.entry.clone()) {
            return false;
        }

        let entry = &logged.entry;
        match self.last_modified.get_mut(&entry.employee_id) {
            Some(ts) if entry.timestamp > *ts => *ts = entry.timestamp.clone(),
            Some(_) => {}
            None => {
                self.last_modified
                    .insert(entry.employee_id.clone(), entry.timestamp.clone());
            }
        }

        self.next_seq = self.next_seq.max(logged.seq + 1);
        self.history.push(logged);
        true
    }

    /// All employees, ordered by id.
    pub fn employees(&self) -> Vec<&Employee> {
        let mut all: Vec<_> = self.employees.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// All history, newest first.
    pub fn history(&self) -> Vec<&LoggedEntry> {
        let mut all: Vec<_> = self.history.iter().collect();
        all.sort_by(|a, b| LoggedEntry::listing_order(a, b));
        all
    }

    /// Employees matching `query`, at most `limit` of them.
    ///
    /// An employee matches when its id starts with the query or either name
    /// contains it, ignoring case. Id-prefix matches come first, then
    /// everything by id. A blank query lists employees by id.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Employee> {
        let needle = query.trim().to_lowercase();

        let mut hits: Vec<(bool, &Employee)> = self
            .employees
            .values()
            .filter_map(|e| {
                let by_id = e.id.to_lowercase().starts_with(&needle);
                let by_name = e.first_name.to_lowercase().contains(&needle)
                    || e.last_name.to_lowercase().contains(&needle);
                (by_id || by_name).then_some((by_id, e))
            })
            .collect();

        hits.sort_by(|(a_id, a), (b_id, b)| b_id.cmp(a_id).then_with(|| a.id.cmp(&b.id)));
        hits.into_iter().take(limit).map(|(_, e)| e).collect()
    }

    /// Number of employees.
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Number of stored history entries.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Latest history timestamp for one employee.
    pub fn last_modified_of(&self, id: &str) -> Option<&Timestamp> {
        self.last_modified.get(id)
    }

    /// Latest history timestamp for every employee with history.
    pub fn last_modified(&self) -> BTreeMap<EmployeeId, Timestamp> {
        self.last_modified
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Export the full state for a peer.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            employees: self
                .employees
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            history: self
                .history()
                .into_iter()
                .map(|l| l.entry.clone())
                .collect(),
            last_modified: self.last_modified(),
        }
    }

    // ------------------------------------------------------------------
    // Planning
    // ------------------------------------------------------------------

    /// Sequence number the next appended entry would get.
    pub fn next_seq(&self) -> Sequence {
        self.next_seq
    }

    /// Plan a local create.
    pub fn plan_create(
        &self,
        id: &str,
        fields: EmployeeFields,
        now: &Timestamp,
    ) -> Result<ChangeSet> {
        if self.contains(id) {
            return Err(Error::AlreadyExists(id.to_string()));
        }

        let mut changes = ChangeSet::new();
        changes
            .employees
            .push(Employee::new(id, fields, self.node.clone(), now.clone()));
        self.plan_entry(&mut changes, HistoryKind::Write, id, now);
        Ok(changes)
    }

    /// Plan a local update.
    pub fn plan_update(
        &self,
        id: &str,
        fields: EmployeeFields,
        now: &Timestamp,
    ) -> Result<ChangeSet> {
        let mut employee = self
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        employee.set_fields(fields, now);

        let mut changes = ChangeSet::new();
        changes.employees.push(employee);
        self.plan_entry(&mut changes, HistoryKind::Update, id, now);
        Ok(changes)
    }

    /// Plan a local read. Reads are recorded facts, so they produce history.
    pub fn plan_read(&self, id: &str, now: &Timestamp) -> Result<(Employee, ChangeSet)> {
        let employee = self
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let mut changes = ChangeSet::new();
        self.plan_entry(&mut changes, HistoryKind::Read, id, now);
        Ok((employee, changes))
    }

    /// Plan a merge of a remote snapshot.
    pub fn plan_merge(&self, remote: &Snapshot, now: &Timestamp) -> (ChangeSet, MergeStats) {
        Resolver::new(self, now).plan(remote)
    }

    fn plan_entry(&self, changes: &mut ChangeSet, kind: HistoryKind, id: &str, now: &Timestamp) {
        let entry = HistoryEntry::new(kind, id, now.clone(), self.node.clone());
        // A second identical event within the same second is the same fact.
        if !self.has_entry(&entry) {
            changes
                .history
                .push(LoggedEntry::new(self.next_seq + changes.history.len() as u64, entry));
        }
    }

    // ------------------------------------------------------------------
    // Applying
    // ------------------------------------------------------------------

    /// Install a planned change set.
    pub fn apply(&mut self, changes: ChangeSet) {
        for employee in changes.employees {
            self.upsert(employee);
        }
        for logged in changes.history {
            self.append_logged(logged);
        }
    }

    /// Create an employee owned by this node.
    pub fn create(&mut self, id: &str, fields: EmployeeFields, now: &Timestamp) -> Result<()> {
        let changes = self.plan_create(id, fields, now)?;
        self.apply(changes);
        Ok(())
    }

    /// Update an existing employee.
    pub fn update(&mut self, id: &str, fields: EmployeeFields, now: &Timestamp) -> Result<()> {
        let changes = self.plan_update(id, fields, now)?;
        self.apply(changes);
        Ok(())
    }

    /// Read an employee, recording the read.
    pub fn read(&mut self, id: &str, now: &Timestamp) -> Result<Employee> {
        let (employee, changes) = self.plan_read(id, now)?;
        self.apply(changes);
        Ok(employee)
    }

    /// Merge a remote snapshot in one step.
    pub fn merge(&mut self, remote: &Snapshot, now: &Timestamp) -> MergeStats {
        let (changes, stats) = self.plan_merge(remote, now);
        self.apply(changes);
        stats
    }
}
