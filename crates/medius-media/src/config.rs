//! Per-media-kind upload policy, loaded once from a YAML file at startup.
//!
//! The bundle has a fixed shape: exactly `image`, `video`, `document`. The
//! config is immutable after load; components receive it by reference or
//! `Arc`, never through globals.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::Path;

/// Policy shared by every media kind.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BaseMediaTypeConfig {
    /// Maximum content size in bytes. Unset means unlimited.
    pub max_file_size: Option<u64>,
    /// Allowed extensions, lowercase, no leading dot. Unset or empty means
    /// any extension.
    pub allowed_formats: Option<Vec<String>>,
}

/// Shrink-to-fit bounds for uploaded images.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ResizeConfig {
    pub max_width: u32,
    pub max_height: u32,
}

/// Output codec for forced re-encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageCodec {
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl ImageCodec {
    pub fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageCodec::Jpeg => image::ImageFormat::Jpeg,
            ImageCodec::Png => image::ImageFormat::Png,
            ImageCodec::Webp => image::ImageFormat::WebP,
            ImageCodec::Gif => image::ImageFormat::Gif,
        }
    }
}

/// Pixel layout the image is converted to before re-encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Luma,
    LumaAlpha,
    Rgb,
    Rgba,
}

impl ColorMode {
    pub fn color_type(self) -> image::ColorType {
        match self {
            ColorMode::Luma => image::ColorType::L8,
            ColorMode::LumaAlpha => image::ColorType::La8,
            ColorMode::Rgb => image::ColorType::Rgb8,
            ColorMode::Rgba => image::ColorType::Rgba8,
        }
    }

    pub fn convert(self, img: image::DynamicImage) -> image::DynamicImage {
        match self {
            ColorMode::Luma => image::DynamicImage::ImageLuma8(img.to_luma8()),
            ColorMode::LumaAlpha => image::DynamicImage::ImageLumaA8(img.to_luma_alpha8()),
            ColorMode::Rgb => image::DynamicImage::ImageRgb8(img.to_rgb8()),
            ColorMode::Rgba => image::DynamicImage::ImageRgba8(img.to_rgba8()),
        }
    }
}

/// Forced output format: re-encode with `codec`, rename to `extension`,
/// convert to `color_mode` when the decoded image differs.
#[derive(Debug, Clone, Deserialize)]
pub struct ForceFormatConfig {
    pub codec: ImageCodec,
    pub extension: String,
    pub color_mode: ColorMode,
}

/// A named thumbnail rendition size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ThumbnailSize {
    pub width: u32,
    pub height: u32,
}

/// Thumbnail renditions offered for the image kind.
///
/// `sizes` keeps the declaration order of the YAML mapping; the first entry
/// is the fallback default.
#[derive(Debug, Clone, Deserialize)]
pub struct ThumbnailsConfig {
    pub default_size: Option<String>,
    #[serde(deserialize_with = "ordered_sizes")]
    pub sizes: Vec<(String, ThumbnailSize)>,
}

impl ThumbnailsConfig {
    pub fn size(&self, name: &str) -> Option<ThumbnailSize> {
        self.sizes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, size)| *size)
    }
}

/// Deserialize a YAML mapping into a `Vec` of entries, preserving file order.
fn ordered_sizes<'de, D>(deserializer: D) -> Result<Vec<(String, ThumbnailSize)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedSizes;

    impl<'de> Visitor<'de> for OrderedSizes {
        type Value = Vec<(String, ThumbnailSize)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a mapping of size name to {width, height}")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut sizes = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, ThumbnailSize>()? {
                sizes.push(entry);
            }
            Ok(sizes)
        }
    }

    deserializer.deserialize_map(OrderedSizes)
}

/// Image-kind policy: the base checks plus transform rules.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageMediaConfig {
    #[serde(flatten)]
    pub base: BaseMediaTypeConfig,
    pub resize: Option<ResizeConfig>,
    pub force_format: Option<ForceFormatConfig>,
    pub thumbnails: Option<ThumbnailsConfig>,
}

/// The per-kind policy bundle. Loading validates the thumbnail default-size
/// invariant; an invalid file aborts startup.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    pub image: ImageMediaConfig,
    pub video: BaseMediaTypeConfig,
    pub document: BaseMediaTypeConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum MediaConfigError {
    #[error("Failed to read media config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse media config: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    #[error("Default thumbnail size `{default_size}` is not a declared size (known: {known:?})")]
    UnknownDefaultThumbnailSize {
        default_size: String,
        known: Vec<String>,
    },
}

impl MediaConfig {
    /// Load and validate the bundle from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, MediaConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| MediaConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Parse and validate the bundle from YAML text.
    pub fn from_yaml_str(raw: &str) -> Result<Self, MediaConfigError> {
        let mut config: MediaConfig = serde_yaml_ng::from_str(raw)?;
        config.normalize()?;
        Ok(config)
    }

    /// Enforce the thumbnail invariant: with non-empty `sizes`, `default_size`
    /// must name a declared size and is auto-filled to the first declared key
    /// when unset.
    fn normalize(&mut self) -> Result<(), MediaConfigError> {
        if let Some(thumbnails) = &mut self.image.thumbnails {
            match thumbnails.default_size.clone() {
                None => {
                    thumbnails.default_size =
                        thumbnails.sizes.first().map(|(name, _)| name.clone());
                }
                Some(default_size) if thumbnails.size(&default_size).is_none() => {
                    return Err(MediaConfigError::UnknownDefaultThumbnailSize {
                        default_size,
                        known: thumbnails.sizes.iter().map(|(n, _)| n.clone()).collect(),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
