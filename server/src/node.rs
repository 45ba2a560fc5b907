//! Mutation operations: the local create, update and read paths.
//!
//! Each successful call records its history entry in the same commit as the
//! record change and, with auto-sync enabled, kicks off a background cycle
//! the caller never waits on.

use crate::error::{AppError, Result};
use crate::replica::Replica;
use crate::sync::SyncCoordinator;
use branchsync_engine::{Employee, EmployeeFields, Error as EngineError};
use std::sync::Arc;

/// The local node as seen by API callers.
pub struct Node {
    replica: Arc<Replica>,
    coordinator: Arc<SyncCoordinator>,
    auto_sync: bool,
}

impl Node {
    pub fn new(replica: Arc<Replica>, coordinator: Arc<SyncCoordinator>, auto_sync: bool) -> Self {
        Self {
            replica,
            coordinator,
            auto_sync,
        }
    }

    pub fn replica(&self) -> &Arc<Replica> {
        &self.replica
    }

    /// Create a new employee owned by this node.
    pub async fn create(&self, id: &str, fields: EmployeeFields) -> Result<Employee> {
        let result = self.replica.create(id, fields).await;
        self.observe("create", id, &result);
        result
    }

    /// Overwrite an existing employee's fields.
    pub async fn update(&self, id: &str, fields: EmployeeFields) -> Result<Employee> {
        let result = self.replica.update(id, fields).await;
        self.observe("update", id, &result);
        result
    }

    /// Point read. Records a `read` fact.
    pub async fn read(&self, id: &str) -> Result<Employee> {
        let result = self.replica.read(id).await;
        self.observe("read", id, &result);
        result
    }

    fn observe(&self, op: &'static str, id: &str, result: &Result<Employee>) {
        match result {
            Ok(_) => {
                tracing::info!(op, employee_id = %id, node = %self.replica.name(), "ok");
                if self.auto_sync {
                    let started = self.coordinator.trigger_all();
                    tracing::debug!(op, started, "post-write sync trigger");
                }
            }
            Err(AppError::Engine(EngineError::AlreadyExists(_))) => {
                tracing::info!(op, employee_id = %id, "exists");
            }
            Err(AppError::Engine(EngineError::NotFound(_))) => {
                tracing::info!(op, employee_id = %id, "not found");
            }
            Err(e) => {
                tracing::error!(op, employee_id = %id, error = %e, "failed");
            }
        }
    }
}
