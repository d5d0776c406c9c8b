//! Validation errors for the media pipeline.
//!
//! Every failure the validator chain can produce is a distinct variant so the
//! API boundary can map each kind to a specific response shape.

use medius_core::MediaType;

#[derive(Debug, thiserror::Error)]
pub enum MediaValidationError {
    #[error("Invalid file name: no extension separator")]
    InvalidFileName,

    #[error("Extension `{extension}` is not allowed")]
    InvalidFileExtension {
        extension: String,
        valid_extensions: Vec<String>,
        media_type: Option<MediaType>,
    },

    #[error("File too large: {file_size} bytes (max: {max_file_size} bytes)")]
    FileTooLarge {
        file_size: u64,
        max_file_size: u64,
        media_type: MediaType,
    },

    #[error("Image processing failed: {0}")]
    ImageProcessing(String),
}
