use serde::{Deserialize, Serialize};

use devhub_core::UserId;

/// Identity of an authenticated user, as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    /// Email as the provider reports it. Not re-validated here: OAuth accounts
    /// can carry addresses our own validation would reject.
    pub email: String,
}

impl Identity {
    pub fn new(id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }

    /// Case-insensitive, whitespace-tolerant email comparison.
    pub fn has_email(&self, email: &str) -> bool {
        normalize_email(&self.email) == normalize_email(email)
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
