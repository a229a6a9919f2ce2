//! Handlers for the `/notes` resource.
//!
//! Writes accept either JSON or `multipart/form-data` (see
//! [`NotePayload`]); uploaded audio goes through the configured
//! [`MediaStorage`](jotter_core::storage::MediaStorage) backend.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use jotter_core::error::CoreError;
use jotter_core::notes::{
    audio_storage_path, parse_category_ref, unknown_category_message, CATEGORY_FK_CONSTRAINT,
};
use jotter_core::types::{DbId, Timestamp};
use jotter_db::models::note::{CreateNote, Note, UpdateNote};
use jotter_db::repositories::{CategoryRepo, NoteRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AudioUpload, MediaBaseUrl, NotePayload};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const REQUIRED_MESSAGE: &str = "This field is required.";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /notes`.
#[derive(Debug, Deserialize)]
pub struct NoteListParams {
    /// Category id to narrow the list to. Empty means no filter.
    pub category: Option<String>,
}

/// External representation of a note.
#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub id: DbId,
    pub title: String,
    pub description: String,
    /// Absolute URL of the attached audio file.
    pub audio_file: Option<String>,
    pub category: Option<DbId>,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
    pub creator: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl NoteResponse {
    pub fn new(note: Note, media: &MediaBaseUrl) -> Self {
        Self {
            id: note.id,
            title: note.title,
            description: note.description,
            audio_file: note.audio_file.as_deref().map(|path| media.url_for(path)),
            category: note.category_id,
            category_name: note.category_name,
            category_color: note.category_color,
            creator: note.creator_id,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/notes
///
/// Lists the caller's notes, optionally narrowed with `?category={id}`.
pub async fn list_notes(
    State(state): State<AppState>,
    auth: AuthUser,
    media: MediaBaseUrl,
    params: Result<Query<NoteListParams>, QueryRejection>,
) -> AppResult<Json<Vec<NoteResponse>>> {
    let Query(params) = params?;
    let category_id = match params.category.as_deref() {
        Some(raw) => parse_category_ref(raw).map_err(|msg| CoreError::field("category", msg))?,
        None => None,
    };

    let notes = NoteRepo::list_by_owner(&state.pool, auth.user_id, category_id).await?;
    Ok(Json(
        notes
            .into_iter()
            .map(|note| NoteResponse::new(note, &media))
            .collect(),
    ))
}

/// POST /api/notes
///
/// Creates a note owned by the caller. `title` is required; `description`
/// defaults to empty and `category` to none.
pub async fn create_note(
    State(state): State<AppState>,
    auth: AuthUser,
    media: MediaBaseUrl,
    payload: NotePayload,
) -> AppResult<(StatusCode, Json<NoteResponse>)> {
    let title = payload
        .title
        .ok_or_else(|| CoreError::field("title", REQUIRED_MESSAGE))?;
    let category_id = payload.category.flatten();

    let mut input = CreateNote {
        title,
        description: payload.description.unwrap_or_default(),
        category_id,
        audio_file: None,
    };
    input.validate()?;
    ensure_category_owned(&state, auth.user_id, category_id).await?;

    input.audio_file = store_audio(&state, payload.audio).await?.flatten();

    let note = match NoteRepo::create(&state.pool, auth.user_id, &input).await {
        Ok(note) => note,
        Err(e) => {
            discard_file(&state, input.audio_file.as_deref()).await;
            return Err(category_write_error(e, category_id));
        }
    };

    tracing::info!(
        user_id = auth.user_id,
        note_id = note.id,
        has_audio = note.audio_file.is_some(),
        "Note created"
    );

    Ok((StatusCode::CREATED, Json(NoteResponse::new(note, &media))))
}

/// GET /api/notes/{id}
pub async fn get_note(
    State(state): State<AppState>,
    auth: AuthUser,
    media: MediaBaseUrl,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<Json<NoteResponse>> {
    let Path(id) = path?;
    let note = NoteRepo::find_by_owner(&state.pool, auth.user_id, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Note", id })?;
    Ok(Json(NoteResponse::new(note, &media)))
}

/// PUT /api/notes/{id}
///
/// Requires `title`; other fields left out keep their current values.
pub async fn replace_note(
    State(state): State<AppState>,
    auth: AuthUser,
    media: MediaBaseUrl,
    path: Result<Path<DbId>, PathRejection>,
    payload: NotePayload,
) -> AppResult<Json<NoteResponse>> {
    let Path(id) = path?;
    let note = apply_update(&state, auth.user_id, id, payload, true).await?;
    Ok(Json(NoteResponse::new(note, &media)))
}

/// PATCH /api/notes/{id}
pub async fn update_note(
    State(state): State<AppState>,
    auth: AuthUser,
    media: MediaBaseUrl,
    path: Result<Path<DbId>, PathRejection>,
    payload: NotePayload,
) -> AppResult<Json<NoteResponse>> {
    let Path(id) = path?;
    let note = apply_update(&state, auth.user_id, id, payload, false).await?;
    Ok(Json(NoteResponse::new(note, &media)))
}

/// DELETE /api/notes/{id}
///
/// Removes the note and, best-effort, its audio file.
pub async fn delete_note(
    State(state): State<AppState>,
    auth: AuthUser,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = path?;
    let note = NoteRepo::delete(&state.pool, auth.user_id, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Note", id })?;

    discard_file(&state, note.audio_file.as_deref()).await;

    tracing::info!(user_id = auth.user_id, note_id = id, "Note deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Shared PUT/PATCH flow. `require_title` is set for PUT.
async fn apply_update(
    state: &AppState,
    owner_id: DbId,
    id: DbId,
    payload: NotePayload,
    require_title: bool,
) -> AppResult<Note> {
    let existing = NoteRepo::find_by_owner(&state.pool, owner_id, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Note", id })?;

    if require_title && payload.title.is_none() {
        return Err(CoreError::field("title", REQUIRED_MESSAGE).into());
    }

    let mut input = UpdateNote {
        title: payload.title,
        description: payload.description,
        category_id: payload.category,
        audio_file: None,
    };
    input.validate()?;
    ensure_category_owned(state, owner_id, input.category_id.flatten()).await?;

    input.audio_file = store_audio(state, payload.audio).await?;
    let new_file = input.audio_file.clone().flatten();

    let updated = match NoteRepo::update(&state.pool, owner_id, id, &input).await {
        Ok(Some(note)) => note,
        Ok(None) => {
            discard_file(state, new_file.as_deref()).await;
            return Err(CoreError::NotFound { entity: "Note", id }.into());
        }
        Err(e) => {
            discard_file(state, new_file.as_deref()).await;
            return Err(category_write_error(e, input.category_id.flatten()));
        }
    };

    // The attachment was replaced or cleared; drop the old file.
    if input.audio_file.is_some() && existing.audio_file != updated.audio_file {
        discard_file(state, existing.audio_file.as_deref()).await;
    }

    tracing::info!(user_id = owner_id, note_id = id, "Note updated");
    Ok(updated)
}

/// Reject a category id the caller does not own.
async fn ensure_category_owned(
    state: &AppState,
    owner_id: DbId,
    category_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(category_id) = category_id {
        let owned = CategoryRepo::find_by_owner(&state.pool, owner_id, category_id)
            .await?
            .is_some();
        if !owned {
            return Err(CoreError::field("category", unknown_category_message(category_id)).into());
        }
    }
    Ok(())
}

/// Map a failed note write to an `AppError`.
///
/// A category deleted after [`ensure_category_owned`] passed trips the
/// foreign key; that is reported like any other unknown category.
fn category_write_error(err: sqlx::Error, category_id: Option<DbId>) -> AppError {
    let category_gone = err.as_database_error().is_some_and(|db| {
        db.is_foreign_key_violation() && db.constraint() == Some(CATEGORY_FK_CONSTRAINT)
    });
    match category_id {
        Some(id) if category_gone => {
            CoreError::field("category", unknown_category_message(id)).into()
        }
        _ => err.into(),
    }
}

/// Persist an uploaded file and map the upload to an `UpdateNote::audio_file`
/// value: `None` leaves the column alone, `Some(None)` clears it.
async fn store_audio(state: &AppState, audio: AudioUpload) -> AppResult<Option<Option<String>>> {
    match audio {
        AudioUpload::Unchanged => Ok(None),
        AudioUpload::Clear => Ok(Some(None)),
        AudioUpload::File { file_name, data } => {
            let path = state
                .storage
                .save(&audio_storage_path(&file_name), &data)
                .await
                .map_err(AppError::from)?;
            Ok(Some(Some(path)))
        }
    }
}

/// Best-effort removal of a stored file; failures are logged, not returned.
async fn discard_file(state: &AppState, path: Option<&str>) {
    if let Some(path) = path {
        if let Err(e) = state.storage.delete(path).await {
            tracing::warn!(path, error = %e, "Failed to remove media file");
        }
    }
}
