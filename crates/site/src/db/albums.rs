//! Album repository.

use sqlx::PgPool;

use folio_core::AlbumId;

use super::photos::{PhotoRow, SEARCH_LIMIT, into_photos, prefix_tsquery};
use super::{AlbumStore, RepositoryError};
use crate::gallery::SearchTerms;
use crate::models::{Photo, PhotoAlbum};

#[derive(Debug, sqlx::FromRow)]
struct AlbumRow {
    id: i32,
    name: String,
    title: String,
    description: String,
    country: String,
}

impl From<AlbumRow> for PhotoAlbum {
    fn from(row: AlbumRow) -> Self {
        Self {
            id: AlbumId::new(row.id),
            name: row.name,
            title: row.title,
            description: row.description,
            country: row.country,
            photos: Vec::new(),
        }
    }
}

/// Repository for albums and album-scoped photo queries.
#[derive(Clone, Copy)]
pub struct AlbumRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AlbumRepository<'a> {
    /// Create a new album repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All albums ordered by title, without photos.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<PhotoAlbum>, RepositoryError> {
        let rows = sqlx::query_as::<_, AlbumRow>(
            "SELECT id, name, title, description, country FROM album ORDER BY title",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(PhotoAlbum::from).collect())
    }
}

impl AlbumStore for AlbumRepository<'_> {
    async fn fetch_by_name(&self, name: &str) -> Result<Option<PhotoAlbum>, RepositoryError> {
        let row = sqlx::query_as::<_, AlbumRow>(
            "SELECT id, name, title, description, country FROM album WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(PhotoAlbum::from))
    }

    async fn fetch_album_photos(&self, album: &PhotoAlbum) -> Result<Vec<Photo>, RepositoryError> {
        let rows = sqlx::query_as::<_, PhotoRow>(
            r"
            SELECT id, album_id, title, description, file_name, views, created_at
            FROM photo
            WHERE album_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(album.id)
        .fetch_all(self.pool)
        .await?;

        into_photos(rows)
    }

    async fn search_album_photos(
        &self,
        album: &PhotoAlbum,
        terms: &SearchTerms,
    ) -> Result<Vec<Photo>, RepositoryError> {
        let Some(query) = prefix_tsquery(terms) else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, PhotoRow>(
            r"
            SELECT id, album_id, title, description, file_name, views, created_at
            FROM photo
            WHERE album_id = $1
              AND search_vector @@ to_tsquery('simple', $2)
            ORDER BY ts_rank(search_vector, to_tsquery('simple', $2)) DESC, id DESC
            LIMIT $3
            ",
        )
        .bind(album.id)
        .bind(&query)
        .bind(SEARCH_LIMIT)
        .fetch_all(self.pool)
        .await?;

        into_photos(rows)
    }
}
