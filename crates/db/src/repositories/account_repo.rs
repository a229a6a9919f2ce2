//! Account creation: the user row plus its default categories.

use sqlx::PgPool;

use super::category_repo::CategoryRepo;
use super::user_repo::COLUMNS;
use crate::models::user::{CreateUser, User};

/// Creates accounts.
pub struct AccountRepo;

impl AccountRepo {
    /// Insert a user and seed its default categories in one transaction.
    ///
    /// Either the user and all three categories are committed, or nothing is.
    /// This is the only way user rows are created, so every account starts
    /// with exactly the default set; later profile updates never touch
    /// categories.
    pub async fn create_with_defaults(
        pool: &PgPool,
        input: &CreateUser,
    ) -> Result<User, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO users
                (email, password_hash, first_name, last_name, is_staff, is_superuser)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.first_name.trim())
            .bind(input.last_name.trim())
            .bind(input.is_staff)
            .bind(input.is_superuser)
            .fetch_one(&mut *tx)
            .await?;

        CategoryRepo::insert_defaults(&mut tx, user.id).await?;

        tx.commit().await?;

        tracing::debug!(user_id = user.id, "Account created with default categories");
        Ok(user)
    }
}
