use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

mod dto;
pub mod errors;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;

pub fn router(state: &AppState) -> Router<AppState> {
    handlers::auth_routes(Arc::clone(&state.auth))
}
