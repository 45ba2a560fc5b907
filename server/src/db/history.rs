//! Database operations for the history table.

use branchsync_engine::{HistoryEntry, HistoryKind, LoggedEntry, Timestamp};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

/// A stored history row from the database.
#[derive(Debug)]
pub struct StoredEntry {
    pub seq: i64,
    pub kind: String,
    pub employee_id: String,
    pub timestamp: String,
    pub origin_node: String,
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for StoredEntry {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(StoredEntry {
            seq: row.try_get("seq")?,
            kind: row.try_get("kind")?,
            employee_id: row.try_get("employee_id")?,
            timestamp: row.try_get("timestamp")?,
            origin_node: row.try_get("origin_node")?,
        })
    }
}

impl StoredEntry {
    /// Convert database row to an engine LoggedEntry.
    pub fn to_logged(&self) -> Result<LoggedEntry, sqlx::Error> {
        let kind: HistoryKind = self
            .kind
            .parse()
            .map_err(|e: String| sqlx::Error::Decode(e.into()))?;
        let timestamp =
            Timestamp::parse(&self.timestamp).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(LoggedEntry::new(
            self.seq as u64,
            HistoryEntry::new(kind, &self.employee_id, timestamp, &self.origin_node),
        ))
    }
}

/// Append a history row. Rows equal on the 4-tuple are ignored.
pub async fn insert_entry(
    conn: &mut SqliteConnection,
    logged: &LoggedEntry,
) -> Result<(), sqlx::Error> {
    let entry = &logged.entry;

    sqlx::query(
        r#"
        INSERT OR IGNORE INTO history (seq, kind, employee_id, timestamp, origin_node)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(logged.seq as i64)
    .bind(entry.kind.as_str())
    .bind(&entry.employee_id)
    .bind(entry.timestamp.as_str())
    .bind(&entry.origin_node)
    .execute(conn)
    .await?;

    Ok(())
}

/// Load the whole history in insertion order.
pub async fn load_history(pool: &SqlitePool) -> Result<Vec<LoggedEntry>, sqlx::Error> {
    let rows = sqlx::query_as::<_, StoredEntry>(
        r#"
        SELECT seq, kind, employee_id, timestamp, origin_node
        FROM history
        ORDER BY seq ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(StoredEntry::to_logged).collect()
}
