//! Photo repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use folio_core::{AlbumId, PhotoId};

use super::{PhotoStore, RepositoryError};
use crate::gallery::SearchTerms;
use crate::models::Photo;

/// Photos returned by the "most popular" listing.
pub const TOP_PHOTOS_LIMIT: i64 = 24;

/// Photos returned by the random browsing view.
pub const RANDOM_SELECTION_LIMIT: i64 = 24;

/// Maximum photos returned by a token search.
pub const SEARCH_LIMIT: i64 = 100;

/// Row shape shared by every photo query.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct PhotoRow {
    id: i32,
    album_id: i32,
    title: String,
    description: String,
    file_name: String,
    views: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<PhotoRow> for Photo {
    type Error = RepositoryError;

    fn try_from(row: PhotoRow) -> Result<Self, Self::Error> {
        if row.file_name.trim().is_empty() {
            return Err(RepositoryError::DataCorruption(format!(
                "photo {} has no file name",
                row.id
            )));
        }

        Ok(Self {
            id: PhotoId::new(row.id),
            album_id: AlbumId::new(row.album_id),
            title: row.title,
            description: row.description,
            file_name: row.file_name,
            views: row.views.max(0),
            created_at: row.created_at,
        })
    }
}

pub(super) fn into_photos(rows: Vec<PhotoRow>) -> Result<Vec<Photo>, RepositoryError> {
    rows.into_iter().map(TryInto::try_into).collect()
}

/// Build a prefix `tsquery` requiring every token.
///
/// Tokens are reduced to their alphanumeric characters so user input can
/// never inject `tsquery` operators. Returns `None` when nothing searchable
/// remains.
#[must_use]
pub fn prefix_tsquery(terms: &SearchTerms) -> Option<String> {
    let parts: Vec<String> = terms
        .iter()
        .map(|token| {
            token
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
        })
        .filter(|token| !token.is_empty())
        .map(|token| format!("{token}:*"))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" & "))
    }
}

/// Repository for photos.
#[derive(Clone, Copy)]
pub struct PhotoRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PhotoRepository<'a> {
    /// Create a new photo repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a photo by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PhotoId) -> Result<Option<Photo>, RepositoryError> {
        let row = sqlx::query_as::<_, PhotoRow>(
            r"
            SELECT id, album_id, title, description, file_name, views, created_at
            FROM photo
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Photo::try_from).transpose()
    }

    /// Increment a photo's view counter and return the updated photo.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn record_view(&self, id: PhotoId) -> Result<Option<Photo>, RepositoryError> {
        let row = sqlx::query_as::<_, PhotoRow>(
            r"
            UPDATE photo
            SET views = views + 1
            WHERE id = $1
            RETURNING id, album_id, title, description, file_name, views, created_at
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Photo::try_from).transpose()
    }
}

impl PhotoStore for PhotoRepository<'_> {
    async fn search(&self, terms: &SearchTerms) -> Result<Vec<Photo>, RepositoryError> {
        let Some(query) = prefix_tsquery(terms) else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, PhotoRow>(
            r"
            SELECT id, album_id, title, description, file_name, views, created_at
            FROM photo
            WHERE search_vector @@ to_tsquery('simple', $1)
            ORDER BY ts_rank(search_vector, to_tsquery('simple', $1)) DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(&query)
        .bind(SEARCH_LIMIT)
        .fetch_all(self.pool)
        .await?;

        into_photos(rows)
    }

    async fn top_photos(&self) -> Result<Vec<Photo>, RepositoryError> {
        let rows = sqlx::query_as::<_, PhotoRow>(
            r"
            SELECT id, album_id, title, description, file_name, views, created_at
            FROM photo
            ORDER BY views DESC, id DESC
            LIMIT $1
            ",
        )
        .bind(TOP_PHOTOS_LIMIT)
        .fetch_all(self.pool)
        .await?;

        into_photos(rows)
    }

    async fn random_selection(&self) -> Result<Vec<Photo>, RepositoryError> {
        let rows = sqlx::query_as::<_, PhotoRow>(
            r"
            SELECT id, album_id, title, description, file_name, views, created_at
            FROM photo
            ORDER BY random()
            LIMIT $1
            ",
        )
        .bind(RANDOM_SELECTION_LIMIT)
        .fetch_all(self.pool)
        .await?;

        into_photos(rows)
    }
}
