use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

/// Media kind enum. The set is closed: each kind carries its own validation
/// policy in the media config, and `image` additionally runs the transform
/// pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "media_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Document,
}

impl MediaType {
    pub const ALL: [MediaType; 3] = [MediaType::Image, MediaType::Video, MediaType::Document];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Document => "document",
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Persisted media record.
///
/// `(storage_id, file_identifier)` is unique: the identifier is the object key
/// under which the content lives in that storage. `ack` marks the record as
/// claimed by an internal workflow; once set, the owner can no longer delete it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Media {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub media_type: MediaType,
    pub ack: bool,
    pub ack_at: Option<DateTime<Utc>>,
    pub owner_id: Uuid,
    pub storage_id: Uuid,
    pub file_identifier: String,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a media record after a successful storage write.
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub title: String,
    pub description: Option<String>,
    pub media_type: MediaType,
    pub owner_id: Uuid,
    pub storage_id: Uuid,
    pub file_identifier: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_round_trip() {
        for kind in MediaType::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            let back: MediaType = serde_json::from_str(&json).unwrap();
            assert_eq!(kind, back);
        }
    }

    #[test]
    fn test_media_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MediaType::Image).unwrap(), "\"image\"");
        assert_eq!(MediaType::Document.as_str(), "document");
    }
}
