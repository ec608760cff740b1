use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::ViewerContext;

/// Resolve session and role for every request and attach a [`ViewerContext`].
///
/// No `Authorization` header means an anonymous viewer. A token the provider
/// does not recognise is rejected with 401 rather than silently downgraded.
pub async fn viewer_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match extract_bearer(req.headers()) {
        Ok(token) => token,
        Err(status) => {
            return errors::json_error(status, "unauthorized", "malformed authorization header");
        }
    };

    let session = match services.sessions.resolve(token.as_deref()).await {
        Ok(session) => session,
        Err(e) => return errors::auth_error_to_response(e),
    };
    if token.is_some() && !session.is_authenticated() {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "session expired or invalid; please sign in again",
        );
    }

    let role = services.roles.resolve_state(&session).await;
    req.extensions_mut().insert(ViewerContext::new(session, role));

    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<String>, StatusCode> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(Some(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_is_optional_but_must_be_well_formed() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), Ok(None));

        headers.insert("authorization", HeaderValue::from_static("Bearer abc "));
        assert_eq!(extract_bearer(&headers), Ok(Some("abc".to_string())));

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer(&headers), Err(StatusCode::UNAUTHORIZED));

        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_bearer(&headers), Err(StatusCode::UNAUTHORIZED));
    }
}
