//! Session and role resolution.
//!
//! Flow: access token → [`SessionResolver`] → [`Identity`] → [`RoleResolver`] → [`Role`].
//! Role resolution never fails outward: any store error degrades to
//! [`Role::Viewer`], the read-only state.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::principal::normalize_email;
use crate::{
    AuthError, AuthProvider, Identity, Role, RoleStore, RoleStoreError, Session, validate_session,
};

/// Default bound on a single session lookup.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a session check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Authenticated(Session),
    Unauthenticated,
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(s) => Some(&s.user),
            SessionState::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// Asks the auth provider for the session behind an access token.
#[derive(Clone)]
pub struct SessionResolver {
    provider: Arc<dyn AuthProvider>,
    timeout: Duration,
}

impl SessionResolver {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            provider,
            timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve the current session.
    ///
    /// No token, an unknown token, or a session outside its validity window all
    /// yield [`SessionState::Unauthenticated`]. A provider that does not answer
    /// in time yields [`AuthError::Timeout`].
    pub async fn resolve(&self, access_token: Option<&str>) -> Result<SessionState, AuthError> {
        let Some(token) = access_token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(SessionState::Unauthenticated);
        };

        let fetched = tokio::time::timeout(self.timeout, self.provider.get_session(token))
            .await
            .map_err(|_| {
                tracing::warn!(timeout_ms = self.timeout.as_millis() as u64, "session lookup timed out");
                AuthError::Timeout(self.timeout)
            })??;

        let Some(session) = fetched else {
            return Ok(SessionState::Unauthenticated);
        };

        match validate_session(&session, Utc::now()) {
            Ok(()) => Ok(SessionState::Authenticated(session)),
            Err(e) => {
                tracing::debug!(user_id = %session.user.id, reason = %e, "ignoring invalid session");
                Ok(SessionState::Unauthenticated)
            }
        }
    }
}

/// Source of emails that were granted editor access but may not have a stored
/// role assignment yet.
pub trait EditorDirectory: Send + Sync {
    fn is_editor(&self, email: &str) -> bool;
}

/// Maps an authenticated identity to its role.
#[derive(Clone)]
pub struct RoleResolver {
    store: Arc<dyn RoleStore>,
    admin_email: String,
    editors: Option<Arc<dyn EditorDirectory>>,
}

impl RoleResolver {
    pub fn new(store: Arc<dyn RoleStore>, admin_email: impl AsRef<str>) -> Self {
        Self {
            store,
            admin_email: normalize_email(admin_email.as_ref()),
            editors: None,
        }
    }

    /// Consult `directory` for identities without a stored assignment.
    pub fn with_editor_directory(mut self, directory: Arc<dyn EditorDirectory>) -> Self {
        self.editors = Some(directory);
        self
    }

    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    /// Resolve the role of an authenticated identity. Never fails: store errors
    /// are logged and the identity is treated as a viewer.
    pub async fn resolve(&self, identity: &Identity) -> Role {
        match self.try_resolve(identity).await {
            Ok(role) => role,
            Err(e) => {
                tracing::warn!(
                    user_id = %identity.id,
                    error = %e,
                    "role resolution failed; treating user as viewer"
                );
                Role::Viewer
            }
        }
    }

    /// Role for a session check result; anonymous callers are viewers.
    pub async fn resolve_state(&self, state: &SessionState) -> Role {
        match state.identity() {
            Some(identity) => self.resolve(identity).await,
            None => Role::Viewer,
        }
    }

    async fn try_resolve(&self, identity: &Identity) -> Result<Role, RoleStoreError> {
        if let Some(assignment) = self.store.get_role(&identity.id).await? {
            tracing::debug!(user_id = %identity.id, role = %assignment.role, "stored role found");
            return Ok(assignment.role);
        }

        if !self.admin_email.is_empty() && identity.has_email(&self.admin_email) {
            match self
                .store
                .insert_role(&identity.id, Role::Admin, &identity.email)
                .await
            {
                Ok(()) => {
                    tracing::info!(user_id = %identity.id, "admin role assigned to configured admin email");
                    return Ok(Role::Admin);
                }
                // A concurrent resolution stored the row first; its value wins.
                Err(RoleStoreError::Conflict(_)) => {
                    let stored = self.store.get_role(&identity.id).await?;
                    tracing::debug!(user_id = %identity.id, "admin role already stored by a concurrent resolution");
                    return Ok(stored.map_or(Role::Admin, |a| a.role));
                }
                Err(e) => return Err(e),
            }
        }

        if let Some(directory) = &self.editors {
            if directory.is_editor(&identity.email) {
                return Ok(Role::Editor);
            }
        }

        Ok(Role::Viewer)
    }

    /// Drop stored assignments for `email` (editor revocation).
    pub async fn revoke_by_email(&self, email: &str) -> Result<usize, RoleStoreError> {
        let removed = self.store.delete_by_email(&normalize_email(email)).await?;
        tracing::info!(email = %normalize_email(email), removed, "role assignments revoked");
        Ok(removed)
    }
}
