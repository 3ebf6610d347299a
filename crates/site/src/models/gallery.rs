//! Gallery domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use folio_core::{AlbumId, CommentId, PhotoId, UserId};

/// A single photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Photo {
    pub id: PhotoId,
    pub album_id: AlbumId,
    pub title: String,
    pub description: String,
    /// File name under the image root.
    pub file_name: String,
    /// View counter, drives the "most popular" listing.
    pub views: i64,
    pub created_at: DateTime<Utc>,
}

/// A photo album.
///
/// `photos` stays empty until a search strategy decides the album's photos
/// are relevant and attaches them with [`PhotoAlbum::with_photos`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoAlbum {
    pub id: AlbumId,
    /// URL name used for lookups (exact, case-sensitive).
    pub name: String,
    pub title: String,
    pub description: String,
    pub country: String,
    pub photos: Vec<Photo>,
}

impl PhotoAlbum {
    /// Attach photos, replacing any already present.
    #[must_use]
    pub fn with_photos(mut self, photos: Vec<Photo>) -> Self {
        self.photos = photos;
        self
    }
}

/// A visitor comment on a photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub photo_id: PhotoId,
    pub user_id: UserId,
    /// Display name of the commenting user.
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Longest accepted comment, in characters.
pub const MAX_COMMENT_LENGTH: usize = 2000;

impl Comment {
    /// Trim a submitted comment body. Returns `None` if it is blank or
    /// longer than [`MAX_COMMENT_LENGTH`] characters.
    #[must_use]
    pub fn clean_body(raw: &str) -> Option<&str> {
        let body = raw.trim();
        let len = body.chars().count();
        (1..=MAX_COMMENT_LENGTH).contains(&len).then_some(body)
    }
}
