//! Database access for the site `PostgreSQL`.
//!
//! # Tables
//!
//! - `album`, `photo` - Gallery content (`photo.search_vector` for token search)
//! - `captcha_icon` - Icons offered by the contact form captcha
//! - `site_user` - Users and their passwordless login state
//! - `favourite`, `photo_comment` - Per-user gallery interactions
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p folio-cli -- migrate
//! ```
//!
//! # Store traits
//!
//! The captcha, search and login logic talk to the database through the
//! `*Store` traits below. Each has a `PostgreSQL` repository implementation;
//! tests substitute in-memory stores.

pub mod albums;
pub mod comments;
pub mod favourites;
pub mod icons;
pub mod photos;
pub mod users;

use std::future::Future;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use folio_core::LoginIdentifier;

pub use albums::AlbumRepository;
pub use comments::CommentRepository;
pub use favourites::FavouriteRepository;
pub use icons::IconRepository;
pub use photos::PhotoRepository;
pub use users::UserRepository;

use crate::captcha::CaptchaIcon;
use crate::gallery::SearchTerms;
use crate::models::{Photo, PhotoAlbum, User};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Source of captcha icons.
pub trait IconStore: Sync {
    /// Up to `quantity` distinct icons in random order.
    fn random_icons(
        &self,
        quantity: usize,
    ) -> impl Future<Output = Result<Vec<CaptchaIcon>, RepositoryError>> + Send;
}

/// Album lookups and album-scoped photo queries.
pub trait AlbumStore: Sync {
    /// Find an album by its exact (case-sensitive) name.
    fn fetch_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<PhotoAlbum>, RepositoryError>> + Send;

    /// Every photo in the album.
    fn fetch_album_photos(
        &self,
        album: &PhotoAlbum,
    ) -> impl Future<Output = Result<Vec<Photo>, RepositoryError>> + Send;

    /// Photos in the album matching all tokens.
    fn search_album_photos(
        &self,
        album: &PhotoAlbum,
        terms: &SearchTerms,
    ) -> impl Future<Output = Result<Vec<Photo>, RepositoryError>> + Send;
}

/// Photo queries across all albums.
pub trait PhotoStore: Sync {
    /// Photos matching all tokens.
    fn search(
        &self,
        terms: &SearchTerms,
    ) -> impl Future<Output = Result<Vec<Photo>, RepositoryError>> + Send;

    /// Most viewed photos.
    fn top_photos(&self) -> impl Future<Output = Result<Vec<Photo>, RepositoryError>> + Send;

    /// A random selection of photos.
    fn random_selection(&self)
    -> impl Future<Output = Result<Vec<Photo>, RepositoryError>> + Send;
}

/// User lookups for passwordless login.
pub trait UserStore: Sync {
    /// Find the user holding a magic link token.
    fn find_by_magic_link(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Find a user by email or phone number.
    fn find_by_login(
        &self,
        login: &LoginIdentifier,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Persist codes, attempt count and login date. Returns `false` if the
    /// user no longer exists.
    fn save_login_details(
        &self,
        user: &User,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

/// Map a unique or foreign key violation to a domain error.
pub(crate) fn map_constraint_error(e: sqlx::Error, conflict: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(conflict.to_owned());
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::NotFound;
        }
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
