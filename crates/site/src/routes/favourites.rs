//! Favourite photo handlers. All require a logged-in user.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use folio_core::PhotoId;

use crate::db::{FavouriteRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::Photo;
use crate::state::AppState;

/// Result of adding or removing a favourite.
#[derive(Debug, Serialize)]
pub struct FavouriteResponse {
    pub photo_id: PhotoId,
    pub favourite: bool,
    /// Whether the request changed anything.
    pub changed: bool,
}

/// GET /favourites
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Photo>>> {
    Ok(Json(
        FavouriteRepository::new(state.pool())
            .list_for_user(user.id)
            .await?,
    ))
}

/// POST /favourites/{photo_id}
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(photo_id): Path<PhotoId>,
) -> Result<Json<FavouriteResponse>> {
    let changed = FavouriteRepository::new(state.pool())
        .add(user.id, photo_id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(format!("photo {photo_id}")),
            other => AppError::Database(other),
        })?;

    Ok(Json(FavouriteResponse {
        photo_id,
        favourite: true,
        changed,
    }))
}

/// POST /favourites/{photo_id}/delete
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(photo_id): Path<PhotoId>,
) -> Result<Json<FavouriteResponse>> {
    let changed = FavouriteRepository::new(state.pool())
        .remove(user.id, photo_id)
        .await?;

    Ok(Json(FavouriteResponse {
        photo_id,
        favourite: false,
        changed,
    }))
}
