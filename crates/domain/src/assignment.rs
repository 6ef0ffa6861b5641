use std::fmt::{Display, Formatter};

use permitra_core::TenantId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generated identifier of a persisted assignment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssignmentId(Uuid);

impl AssignmentId {
    /// Creates a random assignment identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an assignment identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AssignmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for AssignmentId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A persisted link between one role and one permission within a tenant.
///
/// The triple `(permission_id, role_id, tenant_id)` is unique; rows are
/// created and deleted, never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Generated row identifier.
    pub id: AssignmentId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Linked role identifier.
    pub role_id: String,
    /// Linked permission identifier.
    pub permission_id: String,
}
