//! Error types for the branchsync engine.

use crate::EmployeeId;
use thiserror::Error;

/// All possible errors from the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Mutation errors
    #[error("employee already exists: {0}")]
    AlreadyExists(EmployeeId),

    #[error("employee not found: {0}")]
    NotFound(EmployeeId),

    // Input errors
    #[error("invalid timestamp '{0}': expected YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp(String),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
