//! Gallery route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use folio_core::PhotoId;

use crate::db::{AlbumRepository, CommentRepository, PhotoRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::gallery::{PhotoSearchResolver, SearchOutcome};
use crate::middleware::RequireUser;
use crate::models::{Comment, MAX_COMMENT_LENGTH, Photo, PhotoAlbum};
use crate::state::AppState;

/// Query parameters for the photo search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub album: Option<String>,
    pub q: Option<String>,
}

/// New comment body.
#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub body: String,
}

/// Search photos by album and/or text.
///
/// GET /photos?album=&q=
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchOutcome>> {
    let resolver = PhotoSearchResolver::new(
        AlbumRepository::new(state.pool()),
        PhotoRepository::new(state.pool()),
    );
    let outcome = resolver
        .resolve(params.album.as_deref(), params.q.as_deref())
        .await?;
    Ok(Json(outcome))
}

/// List all albums.
///
/// GET /albums
pub async fn albums(State(state): State<AppState>) -> Result<Json<Vec<PhotoAlbum>>> {
    Ok(Json(AlbumRepository::new(state.pool()).list().await?))
}

/// Show a photo and count the view.
///
/// GET /photos/{id}
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<PhotoId>) -> Result<Json<Photo>> {
    PhotoRepository::new(state.pool())
        .record_view(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("photo {id}")))
}

/// Comments on a photo.
///
/// GET /photos/{id}/comments
#[instrument(skip(state))]
pub async fn comments(
    State(state): State<AppState>,
    Path(id): Path<PhotoId>,
) -> Result<Json<Vec<Comment>>> {
    if PhotoRepository::new(state.pool()).get(id).await?.is_none() {
        return Err(AppError::NotFound(format!("photo {id}")));
    }
    let comments = CommentRepository::new(state.pool())
        .list_for_photo(id)
        .await?;
    Ok(Json(comments))
}

/// Add a comment as the logged-in user.
///
/// POST /photos/{id}/comments
#[instrument(skip(state, form), fields(user_id = %user.id))]
pub async fn add_comment(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<PhotoId>,
    Json(form): Json<CommentForm>,
) -> Result<Json<Comment>> {
    let body = Comment::clean_body(&form.body).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Comment must be between 1 and {MAX_COMMENT_LENGTH} characters"
        ))
    })?;

    let comment = CommentRepository::new(state.pool())
        .add(id, user.id, body)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(format!("photo {id}")),
            other => AppError::Database(other),
        })?;

    tracing::info!(comment_id = %comment.id, photo_id = %id, "Comment added");
    Ok(Json(comment))
}
