//! Admin-managed list of emails granted editor access.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use devhub_auth::{Capability, EditorDirectory, Role, authorize};
use devhub_core::{DomainError, DomainResult, EmailAddress};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorEntry {
    pub email: EmailAddress,
    pub created_at: DateTime<Utc>,
}

/// Editor allow-list.
///
/// # Invariants
/// - Every entry is a valid address inside `required_domain`.
/// - At most one entry per email (compared case-insensitively).
/// - Only [`Role::Admin`] may add or remove entries.
#[derive(Debug, Clone)]
pub struct EditorAllowList {
    entries: Vec<EditorEntry>,
    required_domain: String,
}

impl Default for EditorAllowList {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DOMAIN)
    }
}

impl EditorAllowList {
    pub const DEFAULT_DOMAIN: &'static str = "gmail.com";

    pub fn new(required_domain: impl AsRef<str>) -> Self {
        Self {
            entries: Vec::new(),
            required_domain: required_domain
                .as_ref()
                .trim()
                .trim_start_matches('@')
                .to_lowercase(),
        }
    }

    pub fn required_domain(&self) -> &str {
        &self.required_domain
    }

    pub fn list(&self) -> &[EditorEntry] {
        &self.entries
    }

    pub fn contains(&self, email: &str) -> bool {
        self.entries.iter().any(|e| e.email.matches(email))
    }

    /// Parse `raw` and check it against the required domain.
    pub fn validate_email(&self, raw: &str) -> DomainResult<EmailAddress> {
        let invalid = || {
            DomainError::validation(format!(
                "please enter a valid address ending in @{}",
                self.required_domain
            ))
        };
        let email = EmailAddress::parse(raw).map_err(|_| invalid())?;
        if !email.is_in_domain(&self.required_domain) {
            return Err(invalid());
        }
        Ok(email)
    }

    /// Grant editor access to `raw_email`, stamped with `now`.
    pub fn add(
        &mut self,
        role: Role,
        raw_email: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<&EditorEntry> {
        authorize(role, Capability::ManageAccess)?;
        let email = self.validate_email(raw_email)?;
        if self.contains(email.as_str()) {
            return Err(DomainError::validation(format!("{email} is already an editor")));
        }

        tracing::info!(%email, "editor access granted");
        self.entries.push(EditorEntry {
            email,
            created_at: now,
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Revoke editor access. Returns `Ok(false)` if the email was not listed.
    pub fn remove(&mut self, role: Role, email: &str) -> DomainResult<bool> {
        authorize(role, Capability::ManageAccess)?;

        let before = self.entries.len();
        self.entries.retain(|e| !e.email.matches(email));
        let removed = self.entries.len() != before;
        if removed {
            tracing::info!(email = %email.trim().to_lowercase(), "editor access revoked");
        }
        Ok(removed)
    }

    /// Insert entries without an access check (startup seeding).
    pub fn seed(&mut self, entries: impl IntoIterator<Item = EditorEntry>) {
        for entry in entries {
            if !self.contains(entry.email.as_str()) && entry.email.is_in_domain(&self.required_domain) {
                self.entries.push(entry);
            }
        }
    }
}

impl EditorDirectory for EditorAllowList {
    fn is_editor(&self, email: &str) -> bool {
        self.contains(email)
    }
}
