//! Employee records.

use crate::{EmployeeId, NodeName, Timestamp};
use serde::{Deserialize, Serialize};

/// The mutable attributes of an employee, as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeFields {
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

impl EmployeeFields {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            role: role.into(),
        }
    }
}

/// An employee in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// National identifier, unique across the system
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    /// Node that created the record or whose copy was last accepted
    pub origin_node: NodeName,
    /// Last local mutation or accepted remote update. Peers running older
    /// builds do not send it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Employee {
    /// Create a new employee owned by `origin_node`.
    pub fn new(
        id: impl Into<EmployeeId>,
        fields: EmployeeFields,
        origin_node: impl Into<NodeName>,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: fields.first_name,
            last_name: fields.last_name,
            role: fields.role,
            origin_node: origin_node.into(),
            updated_at: Some(updated_at),
        }
    }

    /// The caller-editable attributes.
    pub fn fields(&self) -> EmployeeFields {
        EmployeeFields::new(&self.first_name, &self.last_name, &self.role)
    }

    /// Overwrite the editable attributes after a local update.
    ///
    /// The origin node is left untouched.
    pub fn set_fields(&mut self, fields: EmployeeFields, at: &Timestamp) {
        self.first_name = fields.first_name;
        self.last_name = fields.last_name;
        self.role = fields.role;
        self.touch(at);
    }

    /// Take over every mutable attribute of a newer remote copy.
    pub fn adopt(&mut self, remote: &Employee, at: &Timestamp) {
        self.first_name = remote.first_name.clone();
        self.last_name = remote.last_name.clone();
        self.role = remote.role.clone();
        self.origin_node = remote.origin_node.clone();
        self.touch(at);
    }

    /// Advance `updated_at`, never moving it backwards.
    pub fn touch(&mut self, at: &Timestamp) {
        let next = match &self.updated_at {
            Some(current) => current.latest(at).clone(),
            None => at.clone(),
        };
        self.updated_at = Some(next);
    }
}
