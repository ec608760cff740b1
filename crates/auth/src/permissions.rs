use serde::{Deserialize, Serialize};

/// Capability derived from a role.
///
/// Capabilities are never stored; they are recomputed from the resolved role
/// on every check (see [`crate::authorize`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Create, update and delete events and resources.
    Edit,
    /// Grant and revoke editor access.
    ManageAccess,
}

impl Capability {
    pub const ALL: [Capability; 2] = [Capability::Edit, Capability::ManageAccess];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Edit => "content.edit",
            Capability::ManageAccess => "access.manage",
        }
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
