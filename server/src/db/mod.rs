//! Database module for SQLite persistence of the local replica.

mod employees;
mod history;
mod pool;

pub use employees::*;
pub use history::*;
pub use pool::*;

use branchsync_engine::{ChangeSet, Store};

/// Load the persisted replica into memory.
pub async fn load_store(pool: &Pool, node: &str) -> Result<Store, sqlx::Error> {
    let employees = load_employees(pool).await?;
    let history = load_history(pool).await?;

    tracing::info!(
        employees = employees.len(),
        history = history.len(),
        "Loaded replica from database"
    );

    Ok(Store::from_parts(node, employees, history))
}

/// Write a change set in a single transaction.
pub async fn persist(pool: &Pool, changes: &ChangeSet) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    for employee in &changes.employees {
        upsert_employee(&mut *tx, employee).await?;
    }
    for logged in &changes.history {
        insert_entry(&mut *tx, logged).await?;
    }

    tx.commit().await
}
