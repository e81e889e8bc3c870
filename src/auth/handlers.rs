use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Extension, Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, CredentialsRequest, MessageResponse, PublicUser},
        errors::AuthError,
        middleware::{optional_session, require_session},
        services::{AuthService, AuthSuccess, Session},
    },
    state::AppState,
};

pub fn auth_routes(auth: Arc<AuthService>) -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register).options(preflight))
        .route("/api/auth/login", post(login).options(preflight))
        .route(
            "/api/auth/me",
            get(get_me)
                .route_layer(from_fn_with_state(Arc::clone(&auth), require_session))
                .options(preflight),
        )
        .route(
            "/api/auth/logout",
            post(logout)
                .route_layer(from_fn_with_state(auth, optional_session))
                .options(preflight),
        )
}

/// Bare OPTIONS always succeeds; real CORS preflights never get here.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Bytes,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let body = credentials(&payload)?;
    let auth = Arc::clone(&state.auth);
    let outcome = blocking(move || auth.register(&body.email, &body.password)).await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Bytes,
) -> Result<Json<AuthResponse>, AuthError> {
    let body = credentials(&payload)?;
    let auth = Arc::clone(&state.auth);
    let outcome = blocking(move || auth.login(&body.email, &body.password)).await?;
    Ok(Json(outcome.into()))
}

#[instrument(skip_all)]
pub async fn get_me(session: Option<Extension<Session>>) -> Result<Json<PublicUser>, AuthError> {
    let user = AuthService::current_user(session.as_ref().map(|Extension(s)| s))?;
    Ok(Json(PublicUser::from(user.as_ref())))
}

#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    session: Option<Extension<Session>>,
) -> Json<MessageResponse> {
    let message = state.auth.logout(session.as_ref().map(|Extension(s)| s));
    Json(MessageResponse { message })
}

impl From<AuthSuccess> for AuthResponse {
    fn from(outcome: AuthSuccess) -> Self {
        Self {
            user: PublicUser::from(outcome.user.as_ref()),
            token: outcome.token,
        }
    }
}

/// Bodies are decoded as JSON whatever their `Content-Type` says.
fn credentials(payload: &[u8]) -> Result<CredentialsRequest, AuthError> {
    serde_json::from_slice(payload).map_err(|e| {
        warn!(error = %e, "invalid request body");
        AuthError::Validation("Invalid request body".into())
    })
}

/// Argon2 is deliberately slow; keep it off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, AuthError>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AuthError::Internal(e.into()))?
}
