use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::error::json_error;

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Failures surfaced by the auth service and the access gate.
///
/// "No such user" and "wrong password" both become `InvalidCredentials`, and
/// every gate failure becomes `Unauthenticated`, so callers can't tell which
/// check failed.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("User already exists")]
    UserExists,
    #[error("{}", INVALID_CREDENTIALS)]
    InvalidCredentials,
    #[error("Unauthorized")]
    Unauthenticated,
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::UserExists => StatusCode::CONFLICT,
            AuthError::InvalidCredentials | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AuthError::Internal(e) => {
                error!(error = %e, "internal error");
                json_error(status, "Internal server error")
            }
            other => json_error(status, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: AuthError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn maps_to_status_and_message() {
        let (s, b) = body_of(AuthError::UserExists).await;
        assert_eq!(s, StatusCode::CONFLICT);
        assert_eq!(b, serde_json::json!({"error": "User already exists"}));

        let (s, b) = body_of(AuthError::InvalidCredentials).await;
        assert_eq!(s, StatusCode::UNAUTHORIZED);
        assert_eq!(b["error"], INVALID_CREDENTIALS);

        let (s, b) = body_of(AuthError::Validation("Email and password are required".into())).await;
        assert_eq!(s, StatusCode::BAD_REQUEST);
        assert_eq!(b["error"], "Email and password are required");
    }

    #[tokio::test]
    async fn internal_details_stay_on_the_server() {
        let (s, b) = body_of(AuthError::Internal(anyhow::anyhow!("argon2: out of memory"))).await;
        assert_eq!(s, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(b, serde_json::json!({"error": "Internal server error"}));
    }
}
