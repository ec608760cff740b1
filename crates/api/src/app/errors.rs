use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use devhub_auth::{AuthError, RoleStoreError};
use devhub_core::DomainError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
    }
}

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::InvalidCredentials => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            err.to_string(),
        ),
        AuthError::Timeout(_) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "auth_timeout", err.to_string())
        }
        AuthError::Network(_) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "auth_unavailable", err.to_string())
        }
        AuthError::Provider(msg) => json_error(StatusCode::SERVICE_UNAVAILABLE, "auth_error", msg),
        AuthError::Rejected(msg) => json_error(StatusCode::BAD_REQUEST, "auth_rejected", msg),
        AuthError::Unsupported(msg) => json_error(StatusCode::BAD_REQUEST, "unsupported", msg),
    }
}

pub fn role_store_error_to_response(err: RoleStoreError) -> axum::response::Response {
    tracing::warn!(error = %err, "role store request failed");
    json_error(StatusCode::SERVICE_UNAVAILABLE, "role_store_unavailable", err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (domain_error_to_response(DomainError::validation("x")), StatusCode::BAD_REQUEST),
            (domain_error_to_response(DomainError::forbidden("x")), StatusCode::FORBIDDEN),
            (auth_error_to_response(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED),
            (
                auth_error_to_response(AuthError::Timeout(Duration::from_secs(5))),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                auth_error_to_response(AuthError::Network("refused".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                auth_error_to_response(AuthError::Provider("upstream 500".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                auth_error_to_response(AuthError::Rejected(
                    "Password should be at least 6 characters".into(),
                )),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (res, status) in cases {
            assert_eq!(res.status(), status);
        }
    }
}
