//! Category model and DTOs.

use jotter_core::categories::{
    validate_color, MAX_CATEGORY_COLOR_LENGTH, MAX_CATEGORY_NAME_LENGTH,
};
use jotter_core::types::{DbId, Timestamp};
use jotter_core::validation::validate_not_blank;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `categories` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub color: String,
    #[serde(rename = "creator")]
    pub creator_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a category. The owner always comes from the caller.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategory {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = MAX_CATEGORY_NAME_LENGTH)
    )]
    pub name: String,
    #[validate(
        length(max = MAX_CATEGORY_COLOR_LENGTH),
        custom(function = "validate_color")
    )]
    pub color: String,
}

/// DTO for updating a category. Only provided fields are changed.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCategory {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = MAX_CATEGORY_NAME_LENGTH)
    )]
    pub name: Option<String>,
    #[validate(
        length(max = MAX_CATEGORY_COLOR_LENGTH),
        custom(function = "validate_color")
    )]
    pub color: Option<String>,
}
