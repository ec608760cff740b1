use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};

use devhub_auth::{Role, RoleAssignment, RoleStore, RoleStoreError};
use devhub_core::UserId;

use super::client::SupabaseClient;

pub const DEFAULT_ROLE_TABLE: &str = "user_roles";

#[derive(Debug, Serialize, Deserialize)]
struct RoleRow {
    user_id: String,
    role: String,
    #[serde(default)]
    email: Option<String>,
}

impl TryFrom<RoleRow> for RoleAssignment {
    type Error = RoleStoreError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| RoleStoreError::Decode(e.to_string()))?;
        Ok(RoleAssignment {
            user_id: UserId::new(row.user_id),
            role,
            email: row.email.unwrap_or_default(),
        })
    }
}

fn unavailable(err: impl core::fmt::Display) -> RoleStoreError {
    RoleStoreError::Unavailable(err.to_string())
}

/// Role store backed by a PostgREST table (`user_id`, `role`, `email`).
#[derive(Debug, Clone)]
pub struct SupabaseRoleStore {
    client: SupabaseClient,
    table: String,
}

impl SupabaseRoleStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self::with_table(client, DEFAULT_ROLE_TABLE)
    }

    pub fn with_table(client: SupabaseClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    fn rest(&self, method: Method) -> Result<RequestBuilder, RoleStoreError> {
        let builder = self
            .client
            .request(method, &format!("rest/v1/{}", self.table))
            .map_err(unavailable)?;
        Ok(builder.bearer_auth(self.client.api_key()))
    }
}

#[async_trait]
impl RoleStore for SupabaseRoleStore {
    async fn get_role(&self, user_id: &UserId) -> Result<Option<RoleAssignment>, RoleStoreError> {
        let res = self
            .rest(Method::GET)?
            .query(&[
                ("select", "user_id,role,email".to_string()),
                ("user_id", format!("eq.{user_id}")),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .map_err(unavailable)?;

        if !res.status().is_success() {
            return Err(unavailable(format!("role lookup returned {}", res.status())));
        }

        let rows: Vec<RoleRow> = res
            .json()
            .await
            .map_err(|e| RoleStoreError::Decode(e.to_string()))?;
        rows.into_iter().next().map(RoleAssignment::try_from).transpose()
    }

    async fn insert_role(
        &self,
        user_id: &UserId,
        role: Role,
        email: &str,
    ) -> Result<(), RoleStoreError> {
        let row = RoleRow {
            user_id: user_id.to_string(),
            role: role.as_str().to_string(),
            email: Some(email.to_string()),
        };
        let res = self
            .rest(Method::POST)?
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await
            .map_err(unavailable)?;

        match res.status() {
            s if s.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(RoleStoreError::Conflict(user_id.clone())),
            s => Err(unavailable(format!("role insert returned {s}"))),
        }
    }

    async fn delete_by_email(&self, email: &str) -> Result<usize, RoleStoreError> {
        let res = self
            .rest(Method::DELETE)?
            .header("Prefer", "return=representation")
            .query(&[("email", format!("eq.{}", email.trim().to_lowercase()))])
            .send()
            .await
            .map_err(unavailable)?;

        if !res.status().is_success() {
            return Err(unavailable(format!("role delete returned {}", res.status())));
        }
        let rows: Vec<RoleRow> = res
            .json()
            .await
            .map_err(|e| RoleStoreError::Decode(e.to_string()))?;
        Ok(rows.len())
    }
}
