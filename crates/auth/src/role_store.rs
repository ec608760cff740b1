use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use devhub_core::UserId;

use crate::Role;

/// Stored role of one user. At most one per user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub user_id: UserId,
    pub role: Role,
    pub email: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoleStoreError {
    #[error("role store unavailable: {0}")]
    Unavailable(String),

    #[error("could not decode role record: {0}")]
    Decode(String),

    #[error("role already assigned for user {0}")]
    Conflict(UserId),
}

/// Persistence of role assignments (lives with the external data service).
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn get_role(&self, user_id: &UserId) -> Result<Option<RoleAssignment>, RoleStoreError>;

    async fn insert_role(
        &self,
        user_id: &UserId,
        role: Role,
        email: &str,
    ) -> Result<(), RoleStoreError>;

    /// Remove every assignment recorded for `email`; returns how many went.
    async fn delete_by_email(&self, email: &str) -> Result<usize, RoleStoreError>;
}
