use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{Value, json};

use devhub_auth::{
    AuthError, AuthProvider, AuthStateChange, OAuthProvider, Role, RoleResolver, RoleStore,
    RoleStoreError, SignUpOutcome,
};
use devhub_core::UserId;
use devhub_infra::{SupabaseAuthProvider, SupabaseClient, SupabaseRoleStore};

const USER_ID: &str = "2b7f6c1e-user";
const USER_EMAIL: &str = "admin@devhub.com";
const PASSWORD: &str = "hunter22";

#[derive(Clone, Default)]
struct FakeProject {
    token: Arc<Mutex<Option<String>>>,
    roles: Arc<Mutex<Vec<Value>>>,
}

fn mint_token() -> String {
    let now = Utc::now().timestamp();
    jsonwebtoken::encode(
        &Header::default(),
        &json!({ "sub": USER_ID, "iat": now, "exp": now + 3600, "aud": "authenticated" }),
        &EncodingKey::from_secret(b"project-jwt-secret"),
    )
    .expect("failed to encode jwt")
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn eq_filter(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params.get(key)?.strip_prefix("eq.").map(str::to_string)
}

async fn user(State(p): State<FakeProject>, headers: HeaderMap) -> impl IntoResponse {
    let issued = p.token.lock().unwrap().clone();
    match (bearer(&headers), issued) {
        (Some(got), Some(want)) if got == want => {
            (StatusCode::OK, Json(json!({ "id": USER_ID, "email": USER_EMAIL })))
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "msg": "invalid JWT" })),
        ),
    }
}

async fn token(State(p): State<FakeProject>, Json(body): Json<Value>) -> impl IntoResponse {
    if body["email"] == USER_EMAIL && body["password"] == PASSWORD {
        let token = mint_token();
        *p.token.lock().unwrap() = Some(token.clone());
        return (
            StatusCode::OK,
            Json(json!({
                "access_token": token,
                "token_type": "bearer",
                "expires_in": 3600,
                "user": { "id": USER_ID, "email": USER_EMAIL },
            })),
        );
    }
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" })),
    )
}

async fn signup(Json(body): Json<Value>) -> impl IntoResponse {
    if body["email"] == USER_EMAIL {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "msg": "User already registered" })),
        );
    }
    if body["password"].as_str().is_some_and(|p| p.len() < 6) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "msg": "Password should be at least 6 characters" })),
        );
    }
    if body["email"] == "outage@gmail.com" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "msg": "Database error saving new user" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "id": "new-user", "email": body["email"] })),
    )
}

async fn logout(State(p): State<FakeProject>) -> StatusCode {
    *p.token.lock().unwrap() = None;
    StatusCode::NO_CONTENT
}

async fn select_roles(
    State(p): State<FakeProject>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let user_id = eq_filter(&params, "user_id");
    let rows: Vec<Value> = p
        .roles
        .lock()
        .unwrap()
        .iter()
        .filter(|r| user_id.as_deref().is_none_or(|id| r["user_id"] == id))
        .cloned()
        .collect();
    Json(Value::Array(rows))
}

async fn insert_role(State(p): State<FakeProject>, Json(row): Json<Value>) -> StatusCode {
    let mut roles = p.roles.lock().unwrap();
    if roles.iter().any(|r| r["user_id"] == row["user_id"]) {
        return StatusCode::CONFLICT;
    }
    roles.push(row);
    StatusCode::CREATED
}

async fn delete_roles(
    State(p): State<FakeProject>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let email = eq_filter(&params, "email").unwrap_or_default();
    let mut roles = p.roles.lock().unwrap();
    let (removed, kept): (Vec<Value>, Vec<Value>) =
        roles.drain(..).partition(|r| r["email"] == email.as_str());
    *roles = kept;
    Json(Value::Array(removed))
}

struct FakeSupabase {
    base_url: String,
    project: FakeProject,
    handle: tokio::task::JoinHandle<()>,
}

impl FakeSupabase {
    async fn spawn() -> Self {
        let project = FakeProject::default();
        let app = Router::new()
            .route("/auth/v1/user", get(user))
            .route("/auth/v1/token", post(token))
            .route("/auth/v1/signup", post(signup))
            .route("/auth/v1/logout", post(logout))
            .route(
                "/rest/v1/user_roles",
                get(select_roles).post(insert_role).delete(delete_roles),
            )
            .with_state(project.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            project,
            handle,
        }
    }

    fn client(&self) -> SupabaseClient {
        SupabaseClient::new(&self.base_url, "anon-key", Duration::from_secs(2)).unwrap()
    }
}

impl Drop for FakeSupabase {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn password_sign_in_then_session_lookup() {
    let srv = FakeSupabase::spawn().await;
    let provider = SupabaseAuthProvider::new(srv.client());
    let mut changes = provider.on_auth_state_change();

    let session = provider
        .sign_in_with_password(USER_EMAIL, PASSWORD)
        .await
        .unwrap();
    assert_eq!(session.user.id, UserId::new(USER_ID));
    assert!(session.is_valid_at(Utc::now()));
    assert!(matches!(
        changes.recv().await.unwrap(),
        AuthStateChange::SignedIn(identity) if identity.email == USER_EMAIL
    ));

    let fetched = provider
        .get_session(&session.access_token)
        .await
        .unwrap()
        .expect("session should be live");
    assert_eq!(fetched.user.email, USER_EMAIL);
    assert!(fetched.expires_at > Utc::now());

    provider.sign_out(&session.access_token).await.unwrap();
    assert!(matches!(
        changes.recv().await.unwrap(),
        AuthStateChange::SignedOut(id) if id == UserId::new(USER_ID)
    ));
    assert!(provider.get_session(&session.access_token).await.unwrap().is_none());
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials() {
    let srv = FakeSupabase::spawn().await;
    let provider = SupabaseAuthProvider::new(srv.client());

    let err = provider
        .sign_in_with_password(USER_EMAIL, "nope-nope")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);
}

#[tokio::test]
async fn sign_up_reports_confirmation_and_provider_errors() {
    let srv = FakeSupabase::spawn().await;
    let provider = SupabaseAuthProvider::new(srv.client());

    let outcome = provider
        .sign_up("New.Member@gmail.com", PASSWORD, "http://localhost:3000/")
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        SignUpOutcome::ConfirmationSent { email } if email == "new.member@gmail.com"
    ));

    let err = provider
        .sign_up(USER_EMAIL, PASSWORD, "http://localhost:3000/")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::Rejected("User already registered".to_string()));

    let err = provider
        .sign_up("weak@gmail.com", "123", "http://localhost:3000/")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AuthError::Rejected("Password should be at least 6 characters".to_string())
    );

    let err = provider
        .sign_up("outage@gmail.com", PASSWORD, "http://localhost:3000/")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::Provider("Database error saving new user".to_string()));
}

#[tokio::test]
async fn oauth_url_points_at_authorize_endpoint() {
    let srv = FakeSupabase::spawn().await;
    let provider = SupabaseAuthProvider::new(srv.client());

    let redirect = provider
        .sign_in_with_oauth(OAuthProvider::Github, "http://localhost:3000/")
        .await
        .unwrap();
    assert!(redirect.url.starts_with(&format!("{}/auth/v1/authorize?", srv.base_url)));
    assert!(redirect.url.contains("provider=github"));
}

#[tokio::test]
async fn role_rows_round_trip_through_rest() {
    let srv = FakeSupabase::spawn().await;
    let store = SupabaseRoleStore::new(srv.client());
    let user = UserId::new(USER_ID);

    assert!(store.get_role(&user).await.unwrap().is_none());

    store.insert_role(&user, Role::Editor, "e@gmail.com").await.unwrap();
    let row = store.get_role(&user).await.unwrap().unwrap();
    assert_eq!(row.role, Role::Editor);

    assert_eq!(
        store.insert_role(&user, Role::Admin, "e@gmail.com").await,
        Err(RoleStoreError::Conflict(user.clone()))
    );

    assert_eq!(store.delete_by_email("E@gmail.com").await.unwrap(), 1);
    assert!(store.get_role(&user).await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_role_in_table_is_a_decode_error() {
    let srv = FakeSupabase::spawn().await;
    srv.project
        .roles
        .lock()
        .unwrap()
        .push(json!({ "user_id": USER_ID, "role": "owner", "email": USER_EMAIL }));

    let store = SupabaseRoleStore::new(srv.client());
    assert!(matches!(
        store.get_role(&UserId::new(USER_ID)).await,
        Err(RoleStoreError::Decode(_))
    ));
}

#[tokio::test]
async fn admin_bootstrap_persists_through_rest() {
    let srv = FakeSupabase::spawn().await;
    let client = srv.client();
    let provider = SupabaseAuthProvider::new(client.clone());
    let resolver = RoleResolver::new(Arc::new(SupabaseRoleStore::new(client)), USER_EMAIL);

    let session = provider
        .sign_in_with_password(USER_EMAIL, PASSWORD)
        .await
        .unwrap();
    assert_eq!(resolver.resolve(&session.user).await, Role::Admin);

    let rows = srv.project.roles.lock().unwrap().clone();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["role"], "admin");
}

#[tokio::test]
async fn unreachable_project_is_a_network_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client =
        SupabaseClient::new(&format!("http://{addr}"), "anon-key", Duration::from_secs(1)).unwrap();
    let provider = SupabaseAuthProvider::new(client.clone());
    let err = provider.get_session("whatever").await.unwrap_err();
    assert!(err.is_transient(), "got {err:?}");

    let store = SupabaseRoleStore::new(client);
    assert!(matches!(
        store.get_role(&UserId::new(USER_ID)).await,
        Err(RoleStoreError::Unavailable(_))
    ));
}
