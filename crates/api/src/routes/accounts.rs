//! Route definitions for accounts and token sessions.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::accounts;
use crate::state::AppState;

/// Routes mounted under `/auth`.
///
/// ```text
/// POST  /auth/users            -> register
/// GET   /auth/users/me         -> me
/// PATCH /auth/users/me         -> update_me
/// POST  /auth/token/login      -> login
/// POST  /auth/token/refresh    -> refresh
/// POST  /auth/token/logout     -> logout (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/users", post(accounts::register))
        .route("/auth/users/me", get(accounts::me).patch(accounts::update_me))
        .route("/auth/token/login", post(accounts::login))
        .route("/auth/token/refresh", post(accounts::refresh))
        .route("/auth/token/logout", post(accounts::logout))
}
