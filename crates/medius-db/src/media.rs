//! Media repository: CRUD plus the internal bulk-ack workflow.

use medius_core::{AppError, Media, MediaType, NewMedia};
use sqlx::PgPool;
use uuid::Uuid;

const MEDIA_COLUMNS: &str =
    "id, title, description, media_type, ack, ack_at, owner_id, storage_id, file_identifier, created_at";

/// Filters applied on top of the id set in a bulk-ack request.
#[derive(Debug, Clone, Default)]
pub struct BulkAckFilters {
    pub owner_id: Option<Uuid>,
    pub media_type: Option<MediaType>,
    /// Only ack records that have not been acked before.
    pub first_ack: bool,
}

/// Repository for the media table.
#[derive(Clone)]
pub struct MediaRepository {
    pool: PgPool,
}

impl MediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a record for a file already written to storage.
    ///
    /// A duplicate `(storage_id, file_identifier)` pair violates the unique
    /// constraint and surfaces as a database error.
    #[tracing::instrument(skip(self, new), fields(db.table = "media"))]
    pub async fn create(&self, new: NewMedia) -> Result<Media, AppError> {
        let media = sqlx::query_as::<_, Media>(&format!(
            r#"
            INSERT INTO media (title, description, media_type, owner_id, storage_id, file_identifier)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {MEDIA_COLUMNS}
            "#,
        ))
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.media_type)
        .bind(new.owner_id)
        .bind(new.storage_id)
        .bind(&new.file_identifier)
        .fetch_one(&self.pool)
        .await?;

        Ok(media)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media"))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Media>, AppError> {
        let media = sqlx::query_as::<_, Media>(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(media)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media"))]
    pub async fn get_owned(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Media>, AppError> {
        let media = sqlx::query_as::<_, Media>(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media WHERE id = $1 AND owner_id = $2",
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(media)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media"))]
    pub async fn list_owned(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Media>, AppError> {
        let media = sqlx::query_as::<_, Media>(&format!(
            r#"
            SELECT {MEDIA_COLUMNS} FROM media
            WHERE owner_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(media)
    }

    /// Delete a record on behalf of its owner and return it so the caller can
    /// remove the stored object.
    ///
    /// Acknowledged records are immutable for their owner: the deletion is
    /// rejected with `Forbidden`, not silently ignored.
    #[tracing::instrument(skip(self), fields(db.table = "media"))]
    pub async fn delete_owned(&self, owner_id: Uuid, id: Uuid) -> Result<Media, AppError> {
        let deleted = sqlx::query_as::<_, Media>(&format!(
            r#"
            DELETE FROM media
            WHERE id = $1 AND owner_id = $2 AND NOT ack
            RETURNING {MEDIA_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(media) = deleted {
            return Ok(media);
        }

        // Nothing was deleted: either the record is not the caller's, or it
        // is ack'd and therefore locked.
        match self.get_owned(owner_id, id).await? {
            Some(_) => Err(AppError::Forbidden(
                "Acknowledged media cannot be deleted".to_string(),
            )),
            None => Err(AppError::NotFound("Media not found".to_string())),
        }
    }

    /// Acknowledge a set of records, restricted by the given filters, and
    /// return the updated rows.
    #[tracing::instrument(skip(self, ids), fields(db.table = "media", id_count = ids.len()))]
    pub async fn bulk_ack(
        &self,
        ids: &[Uuid],
        filters: &BulkAckFilters,
    ) -> Result<Vec<Media>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let media = sqlx::query_as::<_, Media>(&format!(
            r#"
            UPDATE media
            SET ack = TRUE, ack_at = now()
            WHERE id = ANY($1)
              AND ($2::uuid IS NULL OR owner_id = $2)
              AND ($3::media_type IS NULL OR media_type = $3)
              AND (NOT $4 OR NOT ack)
            RETURNING {MEDIA_COLUMNS}
            "#,
        ))
        .bind(ids)
        .bind(filters.owner_id)
        .bind(filters.media_type)
        .bind(filters.first_ack)
        .fetch_all(&self.pool)
        .await?;

        Ok(media)
    }
}
