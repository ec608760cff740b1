use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use devhub_auth::{Role, RoleAssignment, RoleStore, RoleStoreError};
use devhub_core::UserId;

/// In-memory role store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRoleStore {
    inner: RwLock<HashMap<UserId, RoleAssignment>>,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an assignment, bypassing the one-per-user check.
    pub fn assign(&self, user_id: UserId, role: Role, email: impl Into<String>) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(
            user_id.clone(),
            RoleAssignment {
                user_id,
                role,
                email: email.into(),
            },
        );
    }

    pub fn list(&self) -> Vec<RoleAssignment> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut rows: Vec<RoleAssignment> = map.values().cloned().collect();
        rows.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        rows
    }
}

fn poisoned() -> RoleStoreError {
    RoleStoreError::Unavailable("role store lock poisoned".to_string())
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn get_role(&self, user_id: &UserId) -> Result<Option<RoleAssignment>, RoleStoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(user_id).cloned())
    }

    async fn insert_role(
        &self,
        user_id: &UserId,
        role: Role,
        email: &str,
    ) -> Result<(), RoleStoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(user_id) {
            return Err(RoleStoreError::Conflict(user_id.clone()));
        }
        map.insert(
            user_id.clone(),
            RoleAssignment {
                user_id: user_id.clone(),
                role,
                email: email.to_string(),
            },
        );
        Ok(())
    }

    async fn delete_by_email(&self, email: &str) -> Result<usize, RoleStoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let needle = email.trim().to_lowercase();
        let before = map.len();
        map.retain(|_, a| a.email.trim().to_lowercase() != needle);
        Ok(before - map.len())
    }
}
