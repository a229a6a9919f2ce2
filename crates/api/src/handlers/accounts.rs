//! Handlers for registration, the current user, and token sessions.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use jotter_core::accounts::{
    normalize_email, LOGIN_FAILED_MESSAGE, MAX_NAME_LENGTH, MIN_PASSWORD_LENGTH,
    PASSWORD_MISMATCH_MESSAGE,
};
use jotter_core::error::{CoreError, FieldErrors, NON_FIELD_ERRORS};
use jotter_db::models::session::CreateSession;
use jotter_db::models::user::{CreateUser, UpdateProfile, User, UserResponse};
use jotter_db::repositories::{AccountRepo, SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    pub password: String,
    pub re_password: String,
    #[serde(default)]
    #[validate(length(max = MAX_NAME_LENGTH))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = MAX_NAME_LENGTH))]
    pub last_name: String,
}

/// Request body for `POST /auth/token/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/token/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub auth_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// POST /api/auth/users
///
/// Register a new account. The account's default categories are created in
/// the same transaction.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let Json(mut input) = payload?;
    input.email = normalize_email(&input.email);

    let mut errors = match input.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => FieldErrors::from(e),
    };
    if let Err(msg) = validate_password_strength(&input.password, MIN_PASSWORD_LENGTH) {
        errors.add("password", msg);
    }
    if input.password != input.re_password {
        errors.add(NON_FIELD_ERRORS, PASSWORD_MISMATCH_MESSAGE);
    }
    errors.into_result()?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = AccountRepo::create_with_defaults(
        &state.pool,
        &CreateUser {
            email: input.email,
            password_hash,
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            is_staff: false,
            is_superuser: false,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /api/auth/users/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<UserResponse>> {
    let user = load_user(&state, &auth).await?;
    Ok(Json(user.into()))
}

/// PATCH /api/auth/users/me
///
/// Update the caller's first/last name.
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<UpdateProfile>, JsonRejection>,
) -> AppResult<Json<UserResponse>> {
    let Json(input) = payload?;
    input.validate()?;

    let user = UserRepo::update_profile(&state.pool, auth.user_id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        })?;

    tracing::info!(user_id = user.id, "Profile updated");
    Ok(Json(user.into()))
}

// ---------------------------------------------------------------------------
// Token sessions
// ---------------------------------------------------------------------------

/// POST /api/auth/token/login
///
/// Exchange email + password for an access token and a refresh token.
/// Unknown email, wrong password and inactive accounts all fail the same way.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<AuthResponse>> {
    let Json(input) = payload?;
    let login_failed = || CoreError::field(NON_FIELD_ERRORS, LOGIN_FAILED_MESSAGE);

    let user = UserRepo::find_by_email(&state.pool, &normalize_email(&input.email))
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(login_failed)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::debug!(user_id = user.id, "Login rejected: wrong password");
        return Err(login_failed().into());
    }

    let response = create_auth_response(&state, user).await?;
    tracing::info!(user_id = response.user.id, "User logged in");
    Ok(Json(response))
}

/// POST /api/auth/token/refresh
///
/// Exchange a refresh token for a new token pair. The old session is revoked
/// as it is looked up, so a token can be spent only once.
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> AppResult<Json<AuthResponse>> {
    let Json(input) = payload?;
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = SessionRepo::consume_active_by_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| CoreError::Unauthorized("Invalid or expired refresh token.".into()))?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| CoreError::Unauthorized("User inactive or deleted.".into()))?;

    Ok(Json(create_auth_response(&state, user).await?))
}

/// POST /api/auth/token/logout
///
/// Revoke every refresh session of the caller. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth.user_id).await?;
    tracing::info!(user_id = auth.user_id, revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_user(state: &AppState, auth: &AuthUser) -> AppResult<User> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        })?;
    Ok(user)
}

/// Issue an access token, open a refresh session, and build the response.
async fn create_auth_response(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let jwt = &state.config.jwt;

    let auth_token = generate_access_token(user.id, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh_hash,
            expires_at: Utc::now() + chrono::Duration::days(jwt.refresh_token_expiry_days),
        },
    )
    .await?;

    Ok(AuthResponse {
        auth_token,
        refresh_token: refresh_plaintext,
        expires_in: jwt.access_token_expiry_secs(),
        user: user.into(),
    })
}
