//! Domain models for the site.
//!
//! These are plain value types built from already-validated database rows.
//! Row structs and their `TryFrom` conversions live next to the queries in
//! [`crate::db`].

pub mod gallery;
pub mod session;
pub mod user;

pub use gallery::{Comment, MAX_COMMENT_LENGTH, Photo, PhotoAlbum};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
