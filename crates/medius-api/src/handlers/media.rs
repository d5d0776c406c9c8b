//! Owner-scoped media endpoints: list, get, delete.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use medius_core::{AppError, Media};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::OwnerIdentity;
use crate::error::HttpAppError;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/user/media
pub async fn list_media(
    identity: OwnerIdentity,
    Query(params): Query<ListParams>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Media>>, HttpAppError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = params.offset.unwrap_or(0).max(0);

    let media = state
        .repository
        .list_owned(identity.owner_id, limit, offset)
        .await?;
    Ok(Json(media))
}

/// GET /api/v1/user/media/{id}
pub async fn get_media(
    identity: OwnerIdentity,
    Path(media_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Media>, HttpAppError> {
    let media = state
        .repository
        .get_owned(identity.owner_id, media_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Media not found".to_string()))?;
    Ok(Json(media))
}

/// DELETE /api/v1/user/media/{id}
///
/// The repository enforces the ack guard: deleting an acknowledged record is
/// rejected with 403. The stored object is removed after the row; a failed
/// object delete surfaces as a storage error.
pub async fn delete_media(
    identity: OwnerIdentity,
    Path(media_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, HttpAppError> {
    let media = state
        .repository
        .delete_owned(identity.owner_id, media_id)
        .await?;

    let manager = state.storage.manager(media.storage_id)?;
    manager.delete(&media.file_identifier).await?;

    tracing::info!(media_id = %media.id, storage_id = %media.storage_id, "Media deleted");

    Ok(StatusCode::NO_CONTENT)
}
