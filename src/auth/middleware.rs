use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use super::{errors::AuthError, services::AuthService};

pub const TOKEN_COOKIE: &str = "token";

/// `Authorization: Bearer <token>` first, then the `token` cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split_once(' '))
        .filter(|(scheme, token)| *scheme == "Bearer" && !token.is_empty() && !token.contains(' '))
        .map(|(_, token)| token.to_owned());

    bearer.or_else(|| {
        CookieJar::from_headers(headers)
            .get(TOKEN_COOKIE)
            .map(|c| c.value().to_owned())
            .filter(|v| !v.is_empty())
    })
}

/// Rejects the request with 401 unless it carries a valid token for a known user.
pub async fn require_session(
    State(auth): State<Arc<AuthService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = token_from_headers(req.headers()).ok_or_else(|| {
        debug!("no token presented");
        AuthError::Unauthenticated
    })?;
    let session = auth.authenticate(&token)?;
    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

/// Attaches a session when one can be resolved; never rejects.
pub async fn optional_session(
    State(auth): State<Arc<AuthService>>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = token_from_headers(req.headers()) {
        if let Ok(session) = auth.authenticate(&token) {
            req.extensions_mut().insert(session);
        }
    }
    next.run(req).await
}
