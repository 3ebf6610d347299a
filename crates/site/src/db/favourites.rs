//! Favourite photos repository.

use sqlx::PgPool;

use folio_core::{PhotoId, UserId};

use super::photos::{PhotoRow, into_photos};
use super::{RepositoryError, map_constraint_error};
use crate::models::Photo;

/// Repository for a user's favourite photos.
#[derive(Clone, Copy)]
pub struct FavouriteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FavouriteRepository<'a> {
    /// Create a new favourite repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Photos the user has marked as favourite, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Photo>, RepositoryError> {
        let rows = sqlx::query_as::<_, PhotoRow>(
            r"
            SELECT p.id, p.album_id, p.title, p.description, p.file_name, p.views, p.created_at
            FROM favourite f
            JOIN photo p ON p.id = f.photo_id
            WHERE f.user_id = $1
            ORDER BY f.created_at DESC, p.id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        into_photos(rows)
    }

    /// Mark a photo as favourite. Adding an existing favourite is a no-op.
    ///
    /// Returns `true` if a new favourite was recorded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the photo or user does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(&self, user_id: UserId, photo_id: PhotoId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO favourite (user_id, photo_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, photo_id) DO NOTHING
            ",
        )
        .bind(user_id)
        .bind(photo_id)
        .execute(self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "favourite already exists"))?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a favourite. Returns `true` if one was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        photo_id: PhotoId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM favourite WHERE user_id = $1 AND photo_id = $2")
            .bind(user_id)
            .bind(photo_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
