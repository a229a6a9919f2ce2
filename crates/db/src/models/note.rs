//! Note model and DTOs.

use jotter_core::notes::MAX_TITLE_LENGTH;
use jotter_core::types::{DbId, Timestamp};
use jotter_core::validation::validate_not_blank;
use sqlx::FromRow;
use validator::Validate;

/// A note row joined with the name and color of its category.
///
/// `audio_file` holds the logical storage path (e.g. `voice_notes/memo.mp3`);
/// the API layer turns it into an absolute URL.
#[derive(Debug, Clone, FromRow)]
pub struct Note {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub audio_file: Option<String>,
    pub category_id: Option<DbId>,
    pub creator_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
}

/// DTO for creating a note.
#[derive(Debug, Clone, Default, Validate)]
pub struct CreateNote {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = MAX_TITLE_LENGTH)
    )]
    pub title: String,
    pub description: String,
    pub category_id: Option<DbId>,
    pub audio_file: Option<String>,
}

/// DTO for updating a note.
///
/// The outer `Option` on `category_id` and `audio_file` means "leave as is"
/// when `None`; `Some(None)` clears the column.
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateNote {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = MAX_TITLE_LENGTH)
    )]
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Option<DbId>>,
    pub audio_file: Option<Option<String>>,
}
