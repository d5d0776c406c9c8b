//! Internal (service-to-service) endpoints.

use axum::extract::State;
use axum::Json;
use medius_core::{AppError, Media, MediaType};
use medius_db::BulkAckFilters;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::ServiceIdentity;
use crate::error::HttpAppError;
use crate::state::AppState;

const MAX_BULK_ACK_IDS: usize = 100;

#[derive(Debug, Deserialize)]
pub struct BulkAckRequest {
    pub ids: Vec<Uuid>,
    pub owner_id: Option<Uuid>,
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub first_ack: bool,
}

/// POST /api/v1/internal/media/bulk_ack
///
/// Marks the given records as acknowledged and returns the updated rows.
/// Records filtered out (wrong owner, wrong kind, already acked with
/// `first_ack`) are skipped silently.
pub async fn bulk_ack(
    _service: ServiceIdentity,
    State(state): State<Arc<AppState>>,
    Json(request): Json<BulkAckRequest>,
) -> Result<Json<Vec<Media>>, HttpAppError> {
    if request.ids.is_empty() || request.ids.len() > MAX_BULK_ACK_IDS {
        return Err(AppError::InvalidInput(format!(
            "ids must contain between 1 and {} entries",
            MAX_BULK_ACK_IDS
        ))
        .into());
    }

    let filters = BulkAckFilters {
        owner_id: request.owner_id,
        media_type: request.media_type,
        first_ack: request.first_ack,
    };

    let media = state.repository.bulk_ack(&request.ids, &filters).await?;

    tracing::info!(
        requested = request.ids.len(),
        acked = media.len(),
        "Bulk ack completed"
    );

    Ok(Json(media))
}
