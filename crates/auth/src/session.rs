use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Identity;

/// Session issued by the auth provider.
///
/// The portal never mints sessions itself; it only reads what the provider
/// returns and checks the validity window.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: Identity,

    /// Opaque bearer token the presentation layer sends back on each request.
    pub access_token: String,

    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("access_token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Session {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        validate_session(self, now).is_ok()
    }
}

/// How far ahead of the local clock `issued_at` may be before a session is
/// treated as not yet valid.
pub const CLOCK_SKEW_LEEWAY: Duration = Duration::seconds(60);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session has expired")]
    Expired,

    #[error("session not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid session window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate a session's time window.
pub fn validate_session(session: &Session, now: DateTime<Utc>) -> Result<(), SessionError> {
    if session.expires_at <= session.issued_at {
        return Err(SessionError::InvalidTimeWindow);
    }
    if now + CLOCK_SKEW_LEEWAY < session.issued_at {
        return Err(SessionError::NotYetValid);
    }
    if now >= session.expires_at {
        return Err(SessionError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(issued_at: DateTime<Utc>, ttl: Duration) -> Session {
        Session {
            user: Identity::new("u-1", "someone@gmail.com"),
            access_token: "secret-token".to_string(),
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    #[test]
    fn window_checks() {
        let now = Utc::now();
        assert!(validate_session(&session(now, Duration::minutes(5)), now).is_ok());
        assert_eq!(
            validate_session(&session(now, Duration::minutes(5)), now + Duration::minutes(5)),
            Err(SessionError::Expired)
        );
        assert_eq!(
            validate_session(
                &session(now, Duration::minutes(5)),
                now - CLOCK_SKEW_LEEWAY - Duration::seconds(1)
            ),
            Err(SessionError::NotYetValid)
        );
        assert_eq!(
            validate_session(&session(now, Duration::zero()), now),
            Err(SessionError::InvalidTimeWindow)
        );
    }

    #[test]
    fn issuer_clock_slightly_ahead_is_tolerated() {
        let now = Utc::now();
        let ahead = session(now + Duration::seconds(5), Duration::hours(1));
        assert_eq!(validate_session(&ahead, now), Ok(()));
        assert!(ahead.is_valid_at(now));

        let edge = session(now + CLOCK_SKEW_LEEWAY, Duration::hours(1));
        assert_eq!(validate_session(&edge, now), Ok(()));
    }

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", session(Utc::now(), Duration::minutes(1)));
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }
}
