//! Employee request bodies.

use crate::error::{AppError, Result};
use branchsync_engine::EmployeeFields;
use serde::Deserialize;

/// Default number of search results.
pub const DEFAULT_SEARCH_LIMIT: usize = 12;

/// Request body for creating an employee.
///
/// Updates take a bare [`EmployeeFields`] body.
#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub id: String,
    #[serde(flatten)]
    pub fields: EmployeeFields,
}

/// Query string of `GET /employees/search`.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

impl SearchQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_SEARCH_LIMIT)
    }
}

/// Normalise an employee id from a body or a path. Blank ids are rejected.
pub fn employee_id(raw: &str) -> Result<&str> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(AppError::BadRequest("id must not be empty".to_string()));
    }
    Ok(id)
}
