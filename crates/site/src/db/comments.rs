//! Photo comment repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use folio_core::{CommentId, PhotoId, UserId};

use super::{RepositoryError, map_constraint_error};
use crate::models::Comment;

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: i32,
    photo_id: i32,
    user_id: i32,
    author: String,
    body: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: CommentId::new(row.id),
            photo_id: PhotoId::new(row.photo_id),
            user_id: UserId::new(row.user_id),
            author: row.author,
            body: row.body,
            created_at: row.created_at,
        }
    }
}

/// Author is the display name, or the email local part when none is set.
const COMMENT_AUTHOR: &str =
    "COALESCE(NULLIF(btrim(u.display_name), ''), split_part(u.email, '@', 1))";

/// Repository for photo comments.
#[derive(Clone, Copy)]
pub struct CommentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CommentRepository<'a> {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Comments on a photo, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_photo(&self, photo_id: PhotoId) -> Result<Vec<Comment>, RepositoryError> {
        let sql = format!(
            r"
            SELECT c.id, c.photo_id, c.user_id, {COMMENT_AUTHOR} AS author, c.body, c.created_at
            FROM photo_comment c
            JOIN site_user u ON u.id = c.user_id
            WHERE c.photo_id = $1
            ORDER BY c.created_at, c.id
            "
        );

        let rows = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(photo_id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    /// Add a comment. The body must already be validated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the photo or user does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(
        &self,
        photo_id: PhotoId,
        user_id: UserId,
        body: &str,
    ) -> Result<Comment, RepositoryError> {
        let sql = format!(
            r"
            WITH inserted AS (
                INSERT INTO photo_comment (photo_id, user_id, body)
                VALUES ($1, $2, $3)
                RETURNING id, photo_id, user_id, body, created_at
            )
            SELECT c.id, c.photo_id, c.user_id, {COMMENT_AUTHOR} AS author, c.body, c.created_at
            FROM inserted c
            JOIN site_user u ON u.id = c.user_id
            "
        );

        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(photo_id)
            .bind(user_id)
            .bind(body)
            .fetch_one(self.pool)
            .await
            .map_err(|e| map_constraint_error(e, "duplicate comment"))?;

        Ok(row.into())
    }
}
