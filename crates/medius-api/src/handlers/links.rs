//! Public read paths: redirect to a presigned original link or a signed
//! thumbnail proxy URL.

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use medius_core::{AppError, Media, MediaType};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::state::AppState;

/// Presigned link for a media record, memoized below the link's own expiry.
async fn original_link(state: &AppState, media: &Media) -> Result<String, HttpAppError> {
    let manager = state.storage.manager(media.storage_id)?;
    let file_identifier = media.file_identifier.clone();
    let expires_in = state.link_expires_in;
    let cache_key = format!("{}:{}", media.storage_id, media.file_identifier);

    let link = state
        .links
        .cached_link(&cache_key, expires_in, || async move {
            manager.link(&file_identifier, expires_in).await
        })
        .await?;

    Ok(link)
}

fn redirect(url: &str, max_age_secs: u64) -> Result<Response, HttpAppError> {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, url)
        .header(
            header::CACHE_CONTROL,
            format!("private, max-age={}", max_age_secs),
        )
        .body(Body::empty())
        .map_err(|e| AppError::Internal(format!("Failed to build redirect: {}", e)).into())
}

async fn load_media(state: &AppState, media_id: Uuid) -> Result<Media, HttpAppError> {
    state
        .repository
        .get(media_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Media not found".to_string()).into())
}

/// GET /api/v1/public/media/{id}/original
pub async fn get_original(
    Path(media_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, HttpAppError> {
    let media = load_media(&state, media_id).await?;
    let link = original_link(&state, &media).await?;
    redirect(&link, state.link_expires_in.as_secs())
}

#[derive(Debug, Deserialize)]
pub struct ThumbnailParams {
    pub size: Option<String>,
}

/// GET /api/v1/public/media/{id}/thumbnail?size=name
///
/// Image kind only; an unknown size name is a not-found condition, never a
/// crash.
pub async fn get_thumbnail(
    Path(media_id): Path<Uuid>,
    Query(params): Query<ThumbnailParams>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, HttpAppError> {
    let media = load_media(&state, media_id).await?;

    if media.media_type != MediaType::Image {
        return Err(AppError::NotFound("No thumbnails for this media".to_string()).into());
    }

    let size = state
        .media
        .image_manager()
        .thumbnail_size(params.size.as_deref())
        .ok_or_else(|| AppError::NotFound("Unknown thumbnail size".to_string()))?;

    let original = original_link(&state, &media).await?;
    let link = state.thumbnailer.thumbnail_link(&original, size);

    redirect(&link, state.link_expires_in.as_secs())
}
