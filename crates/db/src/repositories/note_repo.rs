//! Repository for the `notes` table.
//!
//! Every query is filtered by `creator_id` and returns notes joined with
//! their category so `category_name` / `category_color` reflect the
//! category as it is at read time.

use jotter_core::types::DbId;
use sqlx::PgPool;

use crate::models::note::{CreateNote, Note, UpdateNote};

/// Column list for note queries, selected from `n` (notes) and `c` (categories).
const COLUMNS: &str = "n.id, n.title, n.description, n.audio_file, n.category_id, \
    n.creator_id, n.created_at, n.updated_at, \
    c.name AS category_name, c.color AS category_color";

/// Join clause attaching the (optional) category to `n`.
const CATEGORY_JOIN: &str = "LEFT JOIN categories c ON c.id = n.category_id";

/// Provides owner-scoped CRUD operations for notes.
pub struct NoteRepo;

impl NoteRepo {
    /// List notes owned by `owner_id`, most recently updated first.
    ///
    /// When `category_id` is given only notes filed under it are returned.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: DbId,
        category_id: Option<DbId>,
    ) -> Result<Vec<Note>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notes n {CATEGORY_JOIN}
             WHERE n.creator_id = $1
               AND ($2::BIGINT IS NULL OR n.category_id = $2)
             ORDER BY n.updated_at DESC, n.id DESC"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(owner_id)
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    /// Find a note by ID, only if it belongs to `owner_id`.
    pub async fn find_by_owner(
        pool: &PgPool,
        owner_id: DbId,
        id: DbId,
    ) -> Result<Option<Note>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notes n {CATEGORY_JOIN}
             WHERE n.id = $1 AND n.creator_id = $2"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Create a note owned by `owner_id`, returning it with category details.
    ///
    /// The caller is responsible for checking that `category_id` (if any)
    /// belongs to the same owner.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateNote,
    ) -> Result<Note, sqlx::Error> {
        let query = format!(
            "WITH n AS (
                INSERT INTO notes (title, description, audio_file, category_id, creator_id)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
             )
             SELECT {COLUMNS} FROM n {CATEGORY_JOIN}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(&input.audio_file)
            .bind(input.category_id)
            .bind(owner_id)
            .fetch_one(pool)
            .await
    }

    /// Update a note owned by `owner_id`, returning the updated row.
    ///
    /// `title` and `description` use COALESCE semantics. `category_id` and
    /// `audio_file` are only touched when their outer `Option` is `Some`,
    /// which allows clearing them with `Some(None)`.
    ///
    /// Returns `None` if the note does not exist or is not owned by `owner_id`.
    pub async fn update(
        pool: &PgPool,
        owner_id: DbId,
        id: DbId,
        input: &UpdateNote,
    ) -> Result<Option<Note>, sqlx::Error> {
        let query = format!(
            "WITH n AS (
                UPDATE notes SET
                    title = COALESCE($3, title),
                    description = COALESCE($4, description),
                    category_id = CASE WHEN $5::BOOLEAN THEN $6::BIGINT ELSE category_id END,
                    audio_file = CASE WHEN $7::BOOLEAN THEN $8::TEXT ELSE audio_file END
                WHERE id = $1 AND creator_id = $2
                RETURNING *
             )
             SELECT {COLUMNS} FROM n {CATEGORY_JOIN}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.category_id.is_some())
            .bind(input.category_id.flatten())
            .bind(input.audio_file.is_some())
            .bind(input.audio_file.clone().flatten())
            .fetch_optional(pool)
            .await
    }

    /// Delete a note owned by `owner_id`, returning the deleted row.
    ///
    /// The returned note carries the `audio_file` path so the caller can
    /// remove the stored file.
    pub async fn delete(
        pool: &PgPool,
        owner_id: DbId,
        id: DbId,
    ) -> Result<Option<Note>, sqlx::Error> {
        let query = format!(
            "WITH n AS (
                DELETE FROM notes WHERE id = $1 AND creator_id = $2
                RETURNING *
             )
             SELECT {COLUMNS} FROM n {CATEGORY_JOIN}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Count notes owned by `owner_id`.
    pub async fn count_by_owner(pool: &PgPool, owner_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notes WHERE creator_id = $1")
            .bind(owner_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
