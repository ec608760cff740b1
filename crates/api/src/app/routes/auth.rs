use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use devhub_auth::{OAuthProvider, SignUpOutcome};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::ViewerContext;

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/signup", post(sign_up))
        .route("/oauth/:provider", get(oauth))
        .route("/logout", post(logout))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CredentialsRequest>,
) -> axum::response::Response {
    let session = match services
        .provider
        .sign_in_with_password(&body.email, &body.password)
        .await
    {
        Ok(session) => session,
        Err(e) => return errors::auth_error_to_response(e),
    };

    let role = services.roles.resolve(&session.user).await;
    Json(dto::SignedInResponse::new(session, role)).into_response()
}

pub async fn sign_up(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CredentialsRequest>,
) -> axum::response::Response {
    let outcome = match services
        .provider
        .sign_up(&body.email, &body.password, &services.oauth_redirect)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => return errors::auth_error_to_response(e),
    };

    match outcome {
        SignUpOutcome::SignedIn(session) => {
            let role = services.roles.resolve(&session.user).await;
            (StatusCode::CREATED, Json(dto::SignedInResponse::new(session, role))).into_response()
        }
        SignUpOutcome::ConfirmationSent { email } => (
            StatusCode::ACCEPTED,
            Json(json!({
                "status": "confirmation_sent",
                "email": email,
                "message": "Check your email for the confirmation link!",
            })),
        )
            .into_response(),
    }
}

pub async fn oauth(
    Extension(services): Extension<Arc<AppServices>>,
    Path(provider): Path<String>,
) -> axum::response::Response {
    let provider = match provider.parse::<OAuthProvider>() {
        Ok(p) => p,
        Err(e) => return errors::auth_error_to_response(e),
    };

    match services
        .provider
        .sign_in_with_oauth(provider, &services.oauth_redirect)
        .await
    {
        Ok(redirect) => Json(redirect).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// Ends the caller's session. Anonymous callers have nothing to end.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(viewer): Extension<ViewerContext>,
) -> axum::response::Response {
    let Some(token) = viewer.access_token() else {
        return StatusCode::NO_CONTENT.into_response();
    };

    match services.provider.sign_out(token).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}
