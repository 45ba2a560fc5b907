//! Sync trigger bodies.

use serde::{Deserialize, Serialize};

/// Response of a manual trigger.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncStarted {
    pub started: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer: Option<String>,
}

impl SyncStarted {
    pub fn new(started: bool) -> Self {
        Self {
            started,
            targets: None,
            peer: None,
        }
    }
}

/// Query string of `POST /sync/from`.
#[derive(Debug, Deserialize)]
pub struct SyncFromQuery {
    pub peer: Option<String>,
}
