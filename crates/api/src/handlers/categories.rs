//! Handlers for the `/categories` resource.
//!
//! Every handler is scoped to the authenticated caller; a category owned by
//! someone else is reported as not found.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use jotter_core::error::CoreError;
use jotter_core::types::DbId;
use jotter_db::models::category::{Category, CreateCategory, UpdateCategory};
use jotter_db::repositories::CategoryRepo;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<Category>>> {
    let categories = CategoryRepo::list_by_owner(&state.pool, auth.user_id).await?;
    Ok(Json(categories))
}

/// POST /api/categories
///
/// The owner is always the caller; a `creator` in the body is ignored.
pub async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CreateCategory>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let Json(input) = payload?;
    input.validate()?;

    let category = CategoryRepo::create(&state.pool, auth.user_id, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        category_id = category.id,
        name = %category.name,
        "Category created"
    );

    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    auth: AuthUser,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<Json<Category>> {
    let Path(id) = path?;
    let category = CategoryRepo::find_by_owner(&state.pool, auth.user_id, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Category",
            id,
        })?;
    Ok(Json(category))
}

/// PUT /api/categories/{id}
///
/// Full update: both `name` and `color` are required.
pub async fn replace_category(
    State(state): State<AppState>,
    auth: AuthUser,
    path: Result<Path<DbId>, PathRejection>,
    payload: Result<Json<CreateCategory>, JsonRejection>,
) -> AppResult<Json<Category>> {
    let Path(id) = path?;
    let Json(input) = payload?;
    input.validate()?;

    let update = UpdateCategory {
        name: Some(input.name),
        color: Some(input.color),
    };
    apply_update(&state, auth.user_id, id, &update).await.map(Json)
}

/// PATCH /api/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    auth: AuthUser,
    path: Result<Path<DbId>, PathRejection>,
    payload: Result<Json<UpdateCategory>, JsonRejection>,
) -> AppResult<Json<Category>> {
    let Path(id) = path?;
    let Json(input) = payload?;
    input.validate()?;

    apply_update(&state, auth.user_id, id, &input).await.map(Json)
}

/// DELETE /api/categories/{id}
///
/// Notes filed under the category survive with no category.
pub async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = path?;
    let deleted = CategoryRepo::delete(&state.pool, auth.user_id, id).await?;
    if !deleted {
        return Err(CoreError::NotFound {
            entity: "Category",
            id,
        }
        .into());
    }

    tracing::info!(user_id = auth.user_id, category_id = id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn apply_update(
    state: &AppState,
    owner_id: DbId,
    id: DbId,
    input: &UpdateCategory,
) -> AppResult<Category> {
    let category = CategoryRepo::update(&state.pool, owner_id, id, input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Category",
            id,
        })?;

    tracing::info!(user_id = owner_id, category_id = id, "Category updated");
    Ok(category)
}
