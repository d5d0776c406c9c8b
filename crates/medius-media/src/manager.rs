//! Media managers: the per-kind validator chain.
//!
//! Each kind runs a fixed chain over `(filename, content)`: size check, then
//! extension allow-list, then (image kind only) the resize/reformat
//! transform. The chain order is deliberate — the cheap checks run before any
//! decode so oversized or disallowed input never reaches the image codec.

use bytes::Bytes;
use medius_core::MediaType;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::config::{BaseMediaTypeConfig, ImageMediaConfig, MediaConfig, MediaConfigError, ThumbnailSize};
use crate::error::MediaValidationError;
use crate::filename;
use crate::transform;

/// Validator chain for the base kinds (video/document): size + allow-list.
#[derive(Debug, Clone)]
pub struct BaseMediaManager {
    media_type: MediaType,
    config: BaseMediaTypeConfig,
}

impl BaseMediaManager {
    pub fn new(media_type: MediaType, config: BaseMediaTypeConfig) -> Self {
        Self { media_type, config }
    }

    /// Run the base validators. Content passes through unchanged.
    pub fn validate(&self, filename: &str, content: &Bytes) -> Result<(), MediaValidationError> {
        self.validate_file_size(content)?;
        self.validate_allowed_formats(filename)?;
        Ok(())
    }

    fn validate_file_size(&self, content: &Bytes) -> Result<(), MediaValidationError> {
        if let Some(max_file_size) = self.config.max_file_size {
            let file_size = content.len() as u64;
            if file_size > max_file_size {
                return Err(MediaValidationError::FileTooLarge {
                    file_size,
                    max_file_size,
                    media_type: self.media_type,
                });
            }
        }
        Ok(())
    }

    /// Membership is checked against the extension as extracted: the
    /// configured formats are lowercase, so `photo.PNG` is rejected while
    /// `photo.png` passes. Only the force-format rename lowercases.
    fn validate_allowed_formats(&self, filename: &str) -> Result<(), MediaValidationError> {
        let extension = filename::file_extension(filename)?;

        if let Some(allowed) = &self.config.allowed_formats {
            if !allowed.is_empty() && !allowed.iter().any(|f| f == extension) {
                return Err(MediaValidationError::InvalidFileExtension {
                    extension: extension.to_string(),
                    valid_extensions: allowed.clone(),
                    media_type: Some(self.media_type),
                });
            }
        }

        Ok(())
    }
}

/// Validator chain for the image kind: base checks plus the transform step.
#[derive(Debug, Clone)]
pub struct ImageMediaManager {
    base: BaseMediaManager,
    config: Arc<ImageMediaConfig>,
}

impl ImageMediaManager {
    pub fn new(config: ImageMediaConfig) -> Self {
        Self {
            base: BaseMediaManager::new(MediaType::Image, config.base.clone()),
            config: Arc::new(config),
        }
    }

    /// Run the full image chain. Decode/encode is CPU-bound and runs on a
    /// blocking worker so it cannot stall the async scheduler.
    pub async fn validate(
        &self,
        filename: &str,
        content: Bytes,
    ) -> Result<(String, Bytes), MediaValidationError> {
        self.base.validate(filename, &content)?;

        tracing::debug!(filename = %filename, size_bytes = content.len(), "Running image transform");

        let config = Arc::clone(&self.config);
        let filename = filename.to_string();
        tokio::task::spawn_blocking(move || {
            transform::transform_image(&filename, &content, &config)
        })
        .await
        .map_err(|e| MediaValidationError::ImageProcessing(format!("transform task failed: {}", e)))?
    }

    /// Declared thumbnail size names, in declaration order.
    pub fn thumbnail_sizes(&self) -> Vec<&str> {
        self.config
            .thumbnails
            .as_ref()
            .map(|t| t.sizes.iter().map(|(name, _)| name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Resolve a thumbnail size by name, or the configured default when no
    /// name is given. Returns `None` for unknown names or when thumbnails are
    /// not configured; callers map that to a not-found response.
    pub fn thumbnail_size(&self, name: Option<&str>) -> Option<ThumbnailSize> {
        let thumbnails = self.config.thumbnails.as_ref()?;
        let name = name.or(thumbnails.default_size.as_deref())?;
        thumbnails.size(name)
    }
}

/// A media kind's manager: the closed set of chain variants.
#[derive(Debug, Clone)]
pub enum MediaManager {
    Base(BaseMediaManager),
    Image(ImageMediaManager),
}

impl MediaManager {
    /// Validate `(filename, content)` for this kind, returning the possibly
    /// renamed filename and possibly transformed content.
    pub async fn validate(
        &self,
        filename: &str,
        content: Bytes,
    ) -> Result<(String, Bytes), MediaValidationError> {
        match self {
            MediaManager::Base(manager) => {
                manager.validate(filename, &content)?;
                Ok((filename.to_string(), content))
            }
            MediaManager::Image(manager) => manager.validate(filename, content).await,
        }
    }
}

/// Immutable kind → manager table built once from the loaded config.
#[derive(Debug, Clone)]
pub struct MediaContext {
    managers: HashMap<MediaType, MediaManager>,
}

impl MediaContext {
    pub fn new(config: MediaConfig) -> Self {
        let mut managers = HashMap::with_capacity(MediaType::ALL.len());
        managers.insert(
            MediaType::Image,
            MediaManager::Image(ImageMediaManager::new(config.image)),
        );
        managers.insert(
            MediaType::Video,
            MediaManager::Base(BaseMediaManager::new(MediaType::Video, config.video)),
        );
        managers.insert(
            MediaType::Document,
            MediaManager::Base(BaseMediaManager::new(MediaType::Document, config.document)),
        );
        Self { managers }
    }

    /// Load the config bundle from YAML and build the context.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, MediaConfigError> {
        Ok(Self::new(MediaConfig::from_yaml_file(path)?))
    }

    pub fn manager(&self, media_type: MediaType) -> &MediaManager {
        // The table is total over the closed MediaType set.
        &self.managers[&media_type]
    }

    pub fn image_manager(&self) -> &ImageMediaManager {
        match &self.managers[&MediaType::Image] {
            MediaManager::Image(manager) => manager,
            MediaManager::Base(_) => unreachable!("image kind always gets the image manager"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ResizeConfig, ThumbnailsConfig};
    use image::{GenericImageView, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn base_config(max: Option<u64>, formats: Option<Vec<&str>>) -> BaseMediaTypeConfig {
        BaseMediaTypeConfig {
            max_file_size: max,
            allowed_formats: formats.map(|f| f.into_iter().map(String::from).collect()),
        }
    }

    fn png_bytes(width: u32, height: u32) -> Bytes {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, 255]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        Bytes::from(buffer)
    }

    fn image_manager(config: ImageMediaConfig) -> ImageMediaManager {
        ImageMediaManager::new(config)
    }

    #[test]
    fn test_missing_extension_is_invalid_file_name() {
        let manager = BaseMediaManager::new(MediaType::Document, base_config(None, None));
        let err = manager.validate("noext", &Bytes::from_static(b"x")).unwrap_err();
        assert!(matches!(err, MediaValidationError::InvalidFileName));
    }

    #[test]
    fn test_non_alphanumeric_extension_rejected() {
        let manager = BaseMediaManager::new(MediaType::Document, base_config(None, None));
        let err = manager
            .validate("report.p-df", &Bytes::from_static(b"x"))
            .unwrap_err();
        assert!(matches!(
            err,
            MediaValidationError::InvalidFileExtension { .. }
        ));
    }

    #[test]
    fn test_file_too_large_carries_sizes() {
        let manager = BaseMediaManager::new(MediaType::Video, base_config(Some(4), None));
        let err = manager
            .validate("clip.mp4", &Bytes::from_static(b"12345"))
            .unwrap_err();
        match err {
            MediaValidationError::FileTooLarge {
                file_size,
                max_file_size,
                media_type,
            } => {
                assert_eq!(file_size, 5);
                assert_eq!(max_file_size, 4);
                assert_eq!(media_type, MediaType::Video);
            }
            other => panic!("expected FileTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_size_check_runs_before_extension_check() {
        // Oversized content with a broken filename reports the size failure:
        // the chain order is size -> extension.
        let manager = BaseMediaManager::new(MediaType::Video, base_config(Some(1), None));
        let err = manager.validate("noext", &Bytes::from_static(b"12")).unwrap_err();
        assert!(matches!(err, MediaValidationError::FileTooLarge { .. }));
    }

    #[test]
    fn test_allow_list_is_case_sensitive() {
        let manager = BaseMediaManager::new(
            MediaType::Document,
            base_config(None, Some(vec!["pdf", "txt"])),
        );
        assert!(manager.validate("a.pdf", &Bytes::from_static(b"x")).is_ok());
        assert!(matches!(
            manager.validate("a.PDF", &Bytes::from_static(b"x")),
            Err(MediaValidationError::InvalidFileExtension { .. })
        ));
    }

    #[test]
    fn test_empty_allow_list_accepts_anything() {
        let manager =
            BaseMediaManager::new(MediaType::Document, base_config(None, Some(vec![])));
        assert!(manager.validate("a.xyz", &Bytes::from_static(b"x")).is_ok());
    }

    #[tokio::test]
    async fn test_image_chain_resizes() {
        let manager = image_manager(ImageMediaConfig {
            base: base_config(None, Some(vec!["png"])),
            resize: Some(ResizeConfig {
                max_width: 64,
                max_height: 64,
            }),
            force_format: None,
            thumbnails: None,
        });

        let (name, out) = manager.validate("big.png", png_bytes(256, 128)).await.unwrap();
        assert_eq!(name, "big.png");

        let decoded = image::load_from_memory(&out).unwrap();
        assert!(decoded.width() <= 64 && decoded.height() <= 64);
    }

    #[tokio::test]
    async fn test_image_chain_rejects_disallowed_extension_before_decode() {
        let manager = image_manager(ImageMediaConfig {
            base: base_config(None, Some(vec!["png"])),
            resize: None,
            force_format: None,
            thumbnails: None,
        });

        // Garbage content: must fail on the extension, not on decode.
        let err = manager
            .validate("evil.bmp", Bytes::from_static(b"garbage"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MediaValidationError::InvalidFileExtension { .. }
        ));
    }

    #[test]
    fn test_thumbnail_accessors() {
        let manager = image_manager(ImageMediaConfig {
            base: base_config(None, None),
            resize: None,
            force_format: None,
            thumbnails: Some(ThumbnailsConfig {
                default_size: Some("small".to_string()),
                sizes: vec![
                    (
                        "small".to_string(),
                        ThumbnailSize {
                            width: 64,
                            height: 64,
                        },
                    ),
                    (
                        "large".to_string(),
                        ThumbnailSize {
                            width: 640,
                            height: 640,
                        },
                    ),
                ],
            }),
        });

        assert_eq!(manager.thumbnail_sizes(), ["small", "large"]);
        assert_eq!(
            manager.thumbnail_size(Some("large")).unwrap().width,
            640
        );
        assert_eq!(manager.thumbnail_size(None).unwrap().width, 64);
        assert!(manager.thumbnail_size(Some("missing")).is_none());
    }

    #[test]
    fn test_thumbnail_accessors_without_config() {
        let manager = image_manager(ImageMediaConfig {
            base: base_config(None, None),
            resize: None,
            force_format: None,
            thumbnails: None,
        });
        assert!(manager.thumbnail_sizes().is_empty());
        assert!(manager.thumbnail_size(None).is_none());
        assert!(manager.thumbnail_size(Some("small")).is_none());
    }

    #[test]
    fn test_context_builds_all_kinds() {
        let config = MediaConfig::from_yaml_str(
            "image: {}\nvideo: {}\ndocument: {}\n",
        )
        .unwrap();
        let context = MediaContext::new(config);
        for kind in MediaType::ALL {
            let _ = context.manager(kind);
        }
        let _ = context.image_manager();
    }
}
