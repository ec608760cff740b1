use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Url;
use tokio::sync::broadcast;
use uuid::Uuid;

use devhub_auth::{
    AuthError, AuthProvider, AuthStateChange, Identity, OAuthProvider, OAuthRedirect, Session,
    SignUpOutcome,
};
use devhub_core::{EmailAddress, UserId};

/// Minimum password length accepted on sign-up (matches the hosted default).
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    id: UserId,
    email: String,
    password: String,
    confirmed: bool,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<String, Account>,
    sessions: HashMap<String, Session>,
}

/// In-memory auth provider for tests/dev.
///
/// Passwords are kept in plain text: this type exists to drive the portal
/// locally and in tests, never in front of real users.
#[derive(Debug)]
pub struct InMemoryAuthProvider {
    state: Mutex<State>,
    session_ttl: Duration,
    auto_confirm: bool,
    oauth_base: String,
    events: broadcast::Sender<AuthStateChange>,
}

impl Default for InMemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAuthProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            state: Mutex::new(State::default()),
            session_ttl: Duration::hours(1),
            auto_confirm: true,
            oauth_base: "http://localhost:9999/auth/v1".to_string(),
            events,
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// When disabled, sign-up answers "confirmation sent" and the account
    /// cannot sign in until [`confirm`](Self::confirm) is called.
    pub fn with_auto_confirm(mut self, auto_confirm: bool) -> Self {
        self.auto_confirm = auto_confirm;
        self
    }

    /// Register a confirmed account directly (fixtures, seeding).
    pub fn register(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let mut state = self.state()?;
        let account = Self::create_account(&mut state, email, password, true)?;
        Ok(Identity::new(account.id, account.email))
    }

    pub fn confirm(&self, email: &str) -> Result<(), AuthError> {
        let mut state = self.state()?;
        let account = state
            .accounts
            .get_mut(&email.trim().to_lowercase())
            .ok_or_else(|| AuthError::Rejected("User not found".to_string()))?;
        account.confirmed = true;
        Ok(())
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, AuthError> {
        self.state
            .lock()
            .map_err(|_| AuthError::Provider("auth state lock poisoned".to_string()))
    }

    fn create_account(
        state: &mut State,
        email: &str,
        password: &str,
        confirmed: bool,
    ) -> Result<Account, AuthError> {
        let email = EmailAddress::parse(email).map_err(|e| AuthError::Rejected(e.to_string()))?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Rejected(format!(
                "Password should be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if state.accounts.contains_key(email.as_str()) {
            return Err(AuthError::Rejected("User already registered".to_string()));
        }

        let account = Account {
            id: UserId::new(Uuid::new_v4().to_string()),
            email: email.to_string(),
            password: password.to_string(),
            confirmed,
        };
        state.accounts.insert(account.email.clone(), account.clone());
        Ok(account)
    }

    /// Number of sessions currently held, live or not yet evicted.
    pub fn session_count(&self) -> Result<usize, AuthError> {
        Ok(self.state()?.sessions.len())
    }

    fn open_session(&self, state: &mut State, account: &Account) -> Session {
        let issued_at = Utc::now();
        state.sessions.retain(|_, s| s.expires_at > issued_at);
        let session = Session {
            user: Identity::new(account.id.clone(), account.email.clone()),
            access_token: Uuid::new_v4().simple().to_string(),
            issued_at,
            expires_at: issued_at + self.session_ttl,
        };
        state
            .sessions
            .insert(session.access_token.clone(), session.clone());
        // No subscribers is not an error.
        let _ = self
            .events
            .send(AuthStateChange::SignedIn(session.user.clone()));
        session
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, AuthError> {
        let mut state = self.state()?;
        let Some(session) = state.sessions.get(access_token).cloned() else {
            return Ok(None);
        };
        if session.expires_at <= Utc::now() {
            state.sessions.remove(access_token);
            return Ok(None);
        }
        Ok(Some(session))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let mut state = self.state()?;
        let account = state
            .accounts
            .get(&email.trim().to_lowercase())
            .filter(|a| a.password == password)
            .cloned()
            .ok_or(AuthError::InvalidCredentials)?;
        if !account.confirmed {
            return Err(AuthError::Rejected("Email not confirmed".to_string()));
        }
        Ok(self.open_session(&mut state, &account))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<SignUpOutcome, AuthError> {
        let mut state = self.state()?;
        let account = Self::create_account(&mut state, email, password, self.auto_confirm)?;
        if account.confirmed {
            return Ok(SignUpOutcome::SignedIn(self.open_session(&mut state, &account)));
        }
        tracing::info!(email = %account.email, redirect_to, "confirmation link issued");
        Ok(SignUpOutcome::ConfirmationSent {
            email: account.email,
        })
    }

    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<OAuthRedirect, AuthError> {
        let url = Url::parse_with_params(
            &format!("{}/authorize", self.oauth_base),
            &[("provider", provider.as_str()), ("redirect_to", redirect_to)],
        )
        .map_err(|e| AuthError::Provider(e.to_string()))?;
        Ok(OAuthRedirect {
            provider,
            url: url.to_string(),
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let mut state = self.state()?;
        if let Some(session) = state.sessions.remove(access_token) {
            let _ = self.events.send(AuthStateChange::SignedOut(session.user.id));
        }
        Ok(())
    }

    fn on_auth_state_change(&self) -> broadcast::Receiver<AuthStateChange> {
        self.events.subscribe()
    }
}
