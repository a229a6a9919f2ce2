//! Repository for the `categories` table.
//!
//! Every query is filtered by `creator_id`; a category that belongs to
//! someone else behaves exactly like one that does not exist.

use jotter_core::categories::DEFAULT_CATEGORIES;
use jotter_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::category::{Category, CreateCategory, UpdateCategory};

/// Column list for categories queries.
const COLUMNS: &str = "id, name, color, creator_id, created_at, updated_at";

/// Provides owner-scoped CRUD operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// List all categories owned by `owner_id`, oldest first.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM categories WHERE creator_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, Category>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Find a category by ID, only if it belongs to `owner_id`.
    pub async fn find_by_owner(
        pool: &PgPool,
        owner_id: DbId,
        id: DbId,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM categories WHERE id = $1 AND creator_id = $2");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Create a category owned by `owner_id`, returning the created row.
    ///
    /// A duplicate name for the same owner fails with the
    /// `uq_categories_creator_name` unique violation.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateCategory,
    ) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (name, color, creator_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(input.name.trim())
            .bind(input.color.trim())
            .bind(owner_id)
            .fetch_one(pool)
            .await
    }

    /// Update a category owned by `owner_id`, returning the updated row.
    ///
    /// Returns `None` if the category does not exist or is not owned by
    /// `owner_id`.
    pub async fn update(
        pool: &PgPool,
        owner_id: DbId,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET
                name = COALESCE($3, name),
                color = COALESCE($4, color)
             WHERE id = $1 AND creator_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.color.as_deref().map(str::trim))
            .fetch_optional(pool)
            .await
    }

    /// Delete a category owned by `owner_id`. Returns `true` if a row was deleted.
    ///
    /// Notes filed under the category are kept; their `category_id` becomes
    /// NULL through the foreign key's `ON DELETE SET NULL`.
    pub async fn delete(pool: &PgPool, owner_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND creator_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count categories owned by `owner_id`.
    pub async fn count_by_owner(pool: &PgPool, owner_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM categories WHERE creator_id = $1")
                .bind(owner_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Insert the default category set for a freshly created user.
    ///
    /// Runs inside the caller's transaction so the account and its
    /// categories commit together.
    pub(crate) async fn insert_defaults(
        tx: &mut Transaction<'_, Postgres>,
        owner_id: DbId,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (name, color, creator_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );

        let mut created = Vec::with_capacity(DEFAULT_CATEGORIES.len());
        for default in DEFAULT_CATEGORIES {
            let category = sqlx::query_as::<_, Category>(&query)
                .bind(default.name)
                .bind(default.color)
                .bind(owner_id)
                .fetch_one(&mut **tx)
                .await?;
            created.push(category);
        }
        Ok(created)
    }
}
