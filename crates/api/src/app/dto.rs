use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use devhub_auth::{Role, Session};
use devhub_content::EditorEntry;
use devhub_core::RecordId;

use crate::context::ViewerContext;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AddEditorRequest {
    pub email: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub role: Role,
    pub can_edit: bool,
    pub can_manage_access: bool,
}

impl From<&ViewerContext> for SessionResponse {
    fn from(ctx: &ViewerContext) -> Self {
        let identity = ctx.identity();
        Self {
            authenticated: identity.is_some(),
            user_id: identity.map(|i| i.id.to_string()),
            email: identity.map(|i| i.email.clone()),
            role: ctx.role(),
            can_edit: ctx.can_edit(),
            can_manage_access: ctx.can_manage_access(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignedInResponse {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

impl SignedInResponse {
    pub fn new(session: Session, role: Role) -> Self {
        Self {
            user_id: session.user.id.to_string(),
            email: session.user.email,
            access_token: session.access_token,
            expires_at: session.expires_at,
            role,
        }
    }
}

/// Outcome of an update or delete. `changed: false` means the id did not exist.
#[derive(Debug, Serialize)]
pub struct ChangeResponse {
    pub id: RecordId,
    pub changed: bool,
}

#[derive(Debug, Serialize)]
pub struct EditorResponse {
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&EditorEntry> for EditorResponse {
    fn from(entry: &EditorEntry) -> Self {
        Self {
            email: entry.email.to_string(),
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EditorRemovedResponse {
    pub email: String,
    pub changed: bool,
    pub revoked_assignments: usize,
}
