//! The node's replica: the in-memory [`Store`] behind the single write lock,
//! persisted to SQLite.
//!
//! Every write path (local mutations and whole merges) runs under one
//! `Mutex`. Inside the critical section the change is planned against the
//! current state, committed to the database in one transaction, and only
//! then applied in memory. If the database rejects it, memory is untouched.

use crate::clock::Clock;
use crate::db::{self, Pool};
use crate::error::Result;
use branchsync_engine::Error as EngineError;
use branchsync_engine::{
    ChangeSet, Employee, EmployeeFields, LoggedEntry, MergeStats, NodeName, Snapshot, Store,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Local replica of the registry and history.
pub struct Replica {
    name: NodeName,
    store: Mutex<Store>,
    pool: Pool,
    clock: Arc<dyn Clock>,
}

impl Replica {
    /// Load the persisted state for `node`.
    pub async fn open(pool: Pool, node: &str, clock: Arc<dyn Clock>) -> Result<Self> {
        let store = db::load_store(&pool, node).await?;
        Ok(Self {
            name: node.to_string(),
            store: Mutex::new(store),
            pool,
            clock,
        })
    }

    /// This node's identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    async fn commit(&self, store: &mut Store, changes: ChangeSet) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }
        db::persist(&self.pool, &changes).await?;
        store.apply(changes);
        Ok(())
    }

    /// Insert a new employee owned by this node and record a `write`.
    pub async fn create(&self, id: &str, fields: EmployeeFields) -> Result<Employee> {
        let mut store = self.store.lock().await;
        let now = self.clock.now()?;

        let changes = store.plan_create(id, fields, &now)?;
        self.commit(&mut store, changes).await?;

        stored(&store, id)
    }

    /// Overwrite an employee's fields and record an `update`.
    pub async fn update(&self, id: &str, fields: EmployeeFields) -> Result<Employee> {
        let mut store = self.store.lock().await;
        let now = self.clock.now()?;

        let changes = store.plan_update(id, fields, &now)?;
        self.commit(&mut store, changes).await?;

        stored(&store, id)
    }

    /// Return an employee and record a `read`.
    pub async fn read(&self, id: &str) -> Result<Employee> {
        let mut store = self.store.lock().await;
        let now = self.clock.now()?;

        let (employee, changes) = store.plan_read(id, &now)?;
        self.commit(&mut store, changes).await?;

        Ok(employee)
    }

    /// Merge a peer snapshot as one critical section.
    pub async fn merge(&self, remote: &Snapshot) -> Result<MergeStats> {
        let mut store = self.store.lock().await;
        let now = self.clock.now()?;

        let (changes, stats) = store.plan_merge(remote, &now);
        self.commit(&mut store, changes).await?;

        tracing::info!(
            employee_inserts = stats.employee_inserts,
            employee_updates = stats.employee_updates,
            history_inserts = stats.history_inserts,
            "merge applied"
        );

        Ok(stats)
    }

    /// Point-in-time export for peers.
    pub async fn snapshot(&self) -> Snapshot {
        self.store.lock().await.snapshot()
    }

    /// Employee lookup that is not recorded in history.
    pub async fn get(&self, id: &str) -> Option<Employee> {
        self.store.lock().await.get(id).cloned()
    }

    /// All employees, ordered by id.
    pub async fn employees(&self) -> Vec<Employee> {
        let store = self.store.lock().await;
        store.employees().into_iter().cloned().collect()
    }

    /// Employees whose id starts with, or whose name contains, `query`.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<Employee> {
        let store = self.store.lock().await;
        store.search(query, limit).into_iter().cloned().collect()
    }

    /// History in listing order.
    pub async fn history(&self) -> Vec<LoggedEntry> {
        let store = self.store.lock().await;
        store.history().into_iter().cloned().collect()
    }
}

fn stored(store: &Store, id: &str) -> Result<Employee> {
    store
        .get(id)
        .cloned()
        .ok_or_else(|| EngineError::NotFound(id.to_string()).into())
}
