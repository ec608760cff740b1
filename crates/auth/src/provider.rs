//! Contract with the external authentication service.

use core::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use devhub_core::UserId;

use crate::{Identity, Session};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid login credentials")]
    InvalidCredentials,

    #[error("auth service unreachable: {0}")]
    Network(String),

    #[error("auth service did not answer within {0:?}")]
    Timeout(Duration),

    /// The provider answered with an error of its own (message is user-facing).
    #[error("{0}")]
    Provider(String),

    /// The provider refused the request as given: malformed email, weak
    /// password, duplicate account, unconfirmed email.
    #[error("{0}")]
    Rejected(String),

    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl AuthError {
    /// Failures that say nothing about the caller's credentials.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::Network(_) | AuthError::Timeout(_))
    }
}

/// Third-party identity providers offered on the login dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Github,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
        }
    }
}

impl FromStr for OAuthProvider {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(OAuthProvider::Google),
            "github" => Ok(OAuthProvider::Github),
            other => Err(AuthError::Unsupported(format!("oauth provider '{other}'"))),
        }
    }
}

/// Where to send the browser to continue an OAuth sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OAuthRedirect {
    pub provider: OAuthProvider,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The provider signed the new user in straight away.
    SignedIn(Session),
    /// The provider sent a confirmation link; no session yet.
    ConfirmationSent { email: String },
}

/// Auth state transitions broadcast by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStateChange {
    SignedIn(Identity),
    SignedOut(UserId),
}

/// Request/response client for the external auth service.
///
/// Implementations are constructed explicitly and injected; nothing in the
/// portal reaches for a process-wide client.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Look up the session behind an access token. `Ok(None)` means the token
    /// is unknown or revoked.
    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, AuthError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<SignUpOutcome, AuthError>;

    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<OAuthRedirect, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// Subscribe to sign-in/sign-out notifications. Dropping the receiver
    /// unsubscribes.
    fn on_auth_state_change(&self) -> broadcast::Receiver<AuthStateChange>;
}
