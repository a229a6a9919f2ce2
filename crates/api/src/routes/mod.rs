pub mod accounts;
pub mod categories;
pub mod health;
pub mod notes;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/users                  register (public)
/// /auth/users/me               current user get, update
/// /auth/token/login            login (public)
/// /auth/token/refresh          refresh (public)
/// /auth/token/logout           logout
///
/// /categories                  list, create
/// /categories/{id}             get, replace, update, delete
///
/// /notes                       list (?category={id}), create
/// /notes/{id}                  get, replace, update, delete
/// ```
///
/// Trailing slashes are stripped before routing, so `/notes/` and `/notes`
/// reach the same handler.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(accounts::router())
        .merge(categories::router())
        .merge(notes::router())
}
