//! Shared object-key generation for storage backends.
//!
//! Key format: `{media_kind}/{owner8}/{name}` where `owner8` is the first 8
//! characters of the owner's UUID and `name` is the original filename or, for
//! storages with random filenames, `{uuid}.{original_extension}`.

use medius_core::MediaType;
use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

/// Generate the object key for an upload.
///
/// Random identifiers are v4 UUIDs; collisions are treated as negligible and
/// not handled.
pub fn generate_object_key(
    media_type: MediaType,
    owner_id: Uuid,
    filename: &str,
    random_filenames: bool,
) -> StorageResult<String> {
    let Some((_, extension)) = filename.rsplit_once('.') else {
        return Err(StorageError::InvalidFilename(filename.to_string()));
    };

    let name = if random_filenames {
        format!("{}.{}", Uuid::new_v4(), extension)
    } else {
        filename.to_string()
    };

    let owner = owner_id.to_string();
    Ok(format!("{}/{}/{}", media_type, &owner[..8], name))
}
