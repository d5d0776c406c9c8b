//! Multipart upload handler: validate → store → persist.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use medius_core::{AppError, Media, MediaType, NewMedia};
use std::sync::Arc;

use crate::auth::OwnerIdentity;
use crate::error::HttpAppError;
use crate::state::AppState;

struct UploadRequest {
    title: String,
    description: Option<String>,
    media_type: MediaType,
    filename: String,
    content_type: String,
    content: Bytes,
}

async fn read_multipart(mut multipart: Multipart) -> Result<UploadRequest, HttpAppError> {
    let mut title = None;
    let mut description = None;
    let mut media_type = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => {
                title = Some(field.text().await.map_err(bad_field)?);
            }
            "description" => {
                description = Some(field.text().await.map_err(bad_field)?);
            }
            "media_type" => {
                let raw = field.text().await.map_err(bad_field)?;
                let parsed: MediaType =
                    serde_json::from_value(serde_json::Value::String(raw.clone())).map_err(
                        |_| AppError::InvalidInput(format!("Unknown media type `{}`", raw)),
                    )?;
                media_type = Some(parsed);
            }
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let content = field.bytes().await.map_err(bad_field)?;
                file = Some((filename, content_type, content));
            }
            _ => {}
        }
    }

    let (filename, content_type, content) = file
        .ok_or_else(|| AppError::InvalidInput("Missing `file` field".to_string()))?;
    let media_type = media_type
        .ok_or_else(|| AppError::InvalidInput("Missing `media_type` field".to_string()))?;
    let title = title.ok_or_else(|| AppError::InvalidInput("Missing `title` field".to_string()))?;

    Ok(UploadRequest {
        title,
        description,
        media_type,
        filename,
        content_type,
        content,
    })
}

fn bad_field(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::InvalidInput(format!("Malformed multipart field: {}", e))
}

/// POST /api/v1/user/media
///
/// The storage write happens before the database insert: a record only ever
/// points at content that exists.
pub async fn upload_media(
    identity: OwnerIdentity,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Media>), HttpAppError> {
    let request = read_multipart(multipart).await?;

    let manager = state.media.manager(request.media_type);
    let (filename, content) = manager.validate(&request.filename, request.content).await?;

    let storage_manager = state.storage.default_manager()?;
    let file_identifier = storage_manager
        .save(
            request.media_type,
            identity.owner_id,
            &filename,
            content,
            &request.content_type,
        )
        .await?;

    let media = state
        .repository
        .create(NewMedia {
            title: request.title,
            description: request.description,
            media_type: request.media_type,
            owner_id: identity.owner_id,
            storage_id: storage_manager.storage_id(),
            file_identifier,
        })
        .await?;

    tracing::info!(
        media_id = %media.id,
        media_type = %media.media_type,
        storage_id = %media.storage_id,
        "Media uploaded"
    );

    Ok((StatusCode::CREATED, Json(media)))
}
