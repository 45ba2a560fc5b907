//! Database operations for the employees table.

use branchsync_engine::{Employee, Timestamp};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

/// A stored employee row from the database.
#[derive(Debug)]
pub struct StoredEmployee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub origin_node: String,
    pub updated_at: Option<String>,
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for StoredEmployee {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(StoredEmployee {
            id: row.try_get("id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            role: row.try_get("role")?,
            origin_node: row.try_get("origin_node")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl StoredEmployee {
    /// Convert database row to an engine Employee.
    pub fn to_employee(&self) -> Result<Employee, sqlx::Error> {
        let updated_at = self
            .updated_at
            .as_deref()
            .map(Timestamp::parse)
            .transpose()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(Employee {
            id: self.id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: self.role.clone(),
            origin_node: self.origin_node.clone(),
            updated_at,
        })
    }
}

/// Insert or overwrite an employee row.
pub async fn upsert_employee(
    conn: &mut SqliteConnection,
    employee: &Employee,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO employees (id, first_name, last_name, role, origin_node, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (id) DO UPDATE SET
            first_name = excluded.first_name,
            last_name = excluded.last_name,
            role = excluded.role,
            origin_node = excluded.origin_node,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&employee.id)
    .bind(&employee.first_name)
    .bind(&employee.last_name)
    .bind(&employee.role)
    .bind(&employee.origin_node)
    .bind(employee.updated_at.as_ref().map(|t| t.as_str()))
    .execute(conn)
    .await?;

    Ok(())
}

/// Load every employee, ordered by id.
pub async fn load_employees(pool: &SqlitePool) -> Result<Vec<Employee>, sqlx::Error> {
    let rows = sqlx::query_as::<_, StoredEmployee>(
        r#"
        SELECT id, first_name, last_name, role, origin_node, updated_at
        FROM employees
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(StoredEmployee::to_employee).collect()
}
