use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, Validation};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use tokio::sync::broadcast;

use devhub_auth::{
    AuthError, AuthProvider, AuthStateChange, Identity, OAuthProvider, OAuthRedirect, Session,
    SignUpOutcome,
};

use super::client::{SupabaseClient, error_message};

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl UserPayload {
    fn into_identity(self) -> Identity {
        Identity::new(self.id, self.email.unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    user: UserPayload,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let issued_at = Utc::now();
        Session {
            user: self.user.into_identity(),
            access_token: self.access_token,
            issued_at,
            expires_at: issued_at + Duration::seconds(self.expires_in),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenTimes {
    #[serde(default)]
    iat: Option<i64>,
    exp: i64,
}

/// Read `iat`/`exp` from an access token without checking its signature.
///
/// Only used on tokens the auth service has just accepted.
fn token_window(token: &str) -> Result<(DateTime<Utc>, DateTime<Utc>), AuthError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = jsonwebtoken::decode::<TokenTimes>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| AuthError::Provider(format!("malformed access token: {e}")))?;

    let expires_at = DateTime::<Utc>::from_timestamp(data.claims.exp, 0)
        .ok_or_else(|| AuthError::Provider("access token exp out of range".to_string()))?;
    let issued_at = data
        .claims
        .iat
        .and_then(|iat| DateTime::<Utc>::from_timestamp(iat, 0))
        .unwrap_or(expires_at);
    // A provider clock running ahead must not make a fresh token "not yet valid".
    Ok((issued_at.min(Utc::now()), expires_at))
}

fn network(err: reqwest::Error) -> AuthError {
    AuthError::Network(err.to_string())
}

async fn body_message(res: reqwest::Response) -> String {
    let status = res.status();
    match res.json::<JsonValue>().await {
        Ok(body) => error_message(&body).unwrap_or_else(|| format!("auth service returned {status}")),
        Err(_) => format!("auth service returned {status}"),
    }
}

/// Auth provider backed by a Supabase project's auth API.
#[derive(Debug)]
pub struct SupabaseAuthProvider {
    client: SupabaseClient,
    events: broadcast::Sender<AuthStateChange>,
}

impl SupabaseAuthProvider {
    pub fn new(client: SupabaseClient) -> Self {
        let (events, _) = broadcast::channel(64);
        Self { client, events }
    }

    fn notify(&self, change: AuthStateChange) {
        let _ = self.events.send(change);
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthProvider {
    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, AuthError> {
        let res = self
            .client
            .request(Method::GET, "auth/v1/user")
            .map_err(AuthError::Provider)?
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(network)?;

        match res.status() {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                return Ok(None);
            }
            _ => return Err(AuthError::Provider(body_message(res).await)),
        }

        let user: UserPayload = res.json().await.map_err(network)?;
        let (issued_at, expires_at) = token_window(access_token)?;
        Ok(Some(Session {
            user: user.into_identity(),
            access_token: access_token.to_string(),
            issued_at,
            expires_at,
        }))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let res = self
            .client
            .request(Method::POST, "auth/v1/token")
            .map_err(AuthError::Provider)?
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email.trim(), "password": password }))
            .send()
            .await
            .map_err(network)?;

        let status = res.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let msg = body_message(res).await;
            if msg.to_lowercase().contains("not confirmed") {
                return Err(AuthError::Rejected(msg));
            }
            return Err(AuthError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(AuthError::Provider(body_message(res).await));
        }

        let session = res.json::<TokenResponse>().await.map_err(network)?.into_session();
        tracing::info!(user_id = %session.user.id, "signed in with password");
        self.notify(AuthStateChange::SignedIn(session.user.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<SignUpOutcome, AuthError> {
        let res = self
            .client
            .request(Method::POST, "auth/v1/signup")
            .map_err(AuthError::Provider)?
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email.trim(), "password": password }))
            .send()
            .await
            .map_err(network)?;

        let status = res.status();
        if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
            return Err(AuthError::Rejected(body_message(res).await));
        }
        if !status.is_success() {
            return Err(AuthError::Provider(body_message(res).await));
        }

        let body: JsonValue = res.json().await.map_err(network)?;
        if body.get("access_token").is_some() {
            let session = serde_json::from_value::<TokenResponse>(body)
                .map_err(|e| AuthError::Provider(e.to_string()))?
                .into_session();
            self.notify(AuthStateChange::SignedIn(session.user.clone()));
            return Ok(SignUpOutcome::SignedIn(session));
        }

        let email = body
            .get("email")
            .and_then(JsonValue::as_str)
            .unwrap_or(email)
            .trim()
            .to_lowercase();
        Ok(SignUpOutcome::ConfirmationSent { email })
    }

    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<OAuthRedirect, AuthError> {
        let mut url = self
            .client
            .endpoint("auth/v1/authorize")
            .map_err(AuthError::Provider)?;
        url.query_pairs_mut()
            .append_pair("provider", provider.as_str())
            .append_pair("redirect_to", redirect_to);
        Ok(OAuthRedirect {
            provider,
            url: url.to_string(),
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        // Best effort: only used to tell subscribers who left.
        let user_id = match self.get_session(access_token).await {
            Ok(Some(session)) => Some(session.user.id),
            _ => None,
        };

        let res = self
            .client
            .request(Method::POST, "auth/v1/logout")
            .map_err(AuthError::Provider)?
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(network)?;

        match res.status() {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {}
            _ => return Err(AuthError::Provider(body_message(res).await)),
        }

        if let Some(user_id) = user_id {
            tracing::info!(%user_id, "signed out");
            self.notify(AuthStateChange::SignedOut(user_id));
        }
        Ok(())
    }

    fn on_auth_state_change(&self) -> broadcast::Receiver<AuthStateChange> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Claims {
        sub: String,
        iat: i64,
        exp: i64,
        aud: String,
    }

    #[test]
    fn token_window_reads_unverified_claims() {
        let now = Utc::now().timestamp();
        let token = jsonwebtoken::encode(
            &Header::default(),
            &Claims {
                sub: "u-1".into(),
                iat: now,
                exp: now + 3600,
                aud: "authenticated".into(),
            },
            &EncodingKey::from_secret(b"someone-elses-secret"),
        )
        .unwrap();

        let (issued_at, expires_at) = token_window(&token).unwrap();
        assert_eq!(issued_at.timestamp(), now);
        assert_eq!(expires_at.timestamp(), now + 3600);
    }

    #[test]
    fn token_window_clamps_future_issue_time() {
        let now = Utc::now().timestamp();
        let token = jsonwebtoken::encode(
            &Header::default(),
            &Claims {
                sub: "u-1".into(),
                iat: now + 5,
                exp: now + 3600,
                aud: "authenticated".into(),
            },
            &EncodingKey::from_secret(b"someone-elses-secret"),
        )
        .unwrap();

        let (issued_at, expires_at) = token_window(&token).unwrap();
        assert!(issued_at.timestamp() <= Utc::now().timestamp());
        assert_eq!(expires_at.timestamp(), now + 3600);
        let session = Session {
            user: Identity::new("u-1", "someone@gmail.com"),
            access_token: token,
            issued_at,
            expires_at,
        };
        assert!(session.is_valid_at(Utc::now()));
    }

    #[test]
    fn token_window_rejects_garbage() {
        assert!(matches!(token_window("opaque"), Err(AuthError::Provider(_))));
    }
}
