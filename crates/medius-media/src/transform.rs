//! Image transform step: decode, shrink-to-fit resize, forced re-encode.
//!
//! Everything here is CPU-bound and synchronous; the image manager runs it on
//! a blocking worker thread.

use bytes::Bytes;
use image::imageops::FilterType;
use image::{GenericImageView, ImageReader};
use std::io::Cursor;

use crate::config::ImageMediaConfig;
use crate::error::MediaValidationError;
use crate::filename;

/// Decode `content`, apply the configured resize and/or format force, and
/// re-encode. The output container is the forced codec when one is
/// configured, otherwise the originally decoded format. The filename is
/// rewritten only by a force-format rename.
pub fn transform_image(
    filename: &str,
    content: &[u8],
    config: &ImageMediaConfig,
) -> Result<(String, Bytes), MediaValidationError> {
    let reader = ImageReader::new(Cursor::new(content))
        .with_guessed_format()
        .map_err(|e| MediaValidationError::ImageProcessing(format!("format detection: {}", e)))?;

    let original_format = reader.format().ok_or_else(|| {
        MediaValidationError::ImageProcessing("unrecognized image format".to_string())
    })?;

    let mut img = reader
        .decode()
        .map_err(|e| MediaValidationError::ImageProcessing(format!("decode: {}", e)))?;

    if let Some(resize) = &config.resize {
        // Contain within the bounds, preserving aspect ratio; never upscale.
        if img.width() > resize.max_width || img.height() > resize.max_height {
            img = img.resize(resize.max_width, resize.max_height, FilterType::Lanczos3);
        }
    }

    let mut output_format = original_format;
    let mut filename = filename.to_string();

    if let Some(force) = &config.force_format {
        output_format = force.codec.to_image_format();
        filename = filename::change_extension(&filename, &force.extension)?;

        if img.color() != force.color_mode.color_type() {
            img = force.color_mode.convert(img);
        }
    }

    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), output_format)
        .map_err(|e| MediaValidationError::ImageProcessing(format!("encode: {}", e)))?;

    Ok((filename, Bytes::from(buffer)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BaseMediaTypeConfig, ColorMode, ForceFormatConfig, ImageCodec, ResizeConfig,
    };
    use image::{GenericImageView, ImageFormat, Rgba, RgbaImage};

    fn png_image(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([12, 80, 160, 255]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn config(
        resize: Option<ResizeConfig>,
        force_format: Option<ForceFormatConfig>,
    ) -> ImageMediaConfig {
        ImageMediaConfig {
            base: BaseMediaTypeConfig::default(),
            resize,
            force_format,
            thumbnails: None,
        }
    }

    fn decode(data: &[u8]) -> image::DynamicImage {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .unwrap()
            .decode()
            .unwrap()
    }

    #[test]
    fn test_resize_contains_within_bounds() {
        let data = png_image(400, 200);
        let cfg = config(
            Some(ResizeConfig {
                max_width: 100,
                max_height: 100,
            }),
            None,
        );

        let (name, out) = transform_image("wide.png", &data, &cfg).unwrap();
        assert_eq!(name, "wide.png");

        let resized = decode(&out);
        let (w, h) = resized.dimensions();
        assert!(w <= 100 && h <= 100);
        // 400x200 contained in 100x100 is 100x50; allow 1px rounding.
        assert_eq!(w, 100);
        assert!((h as i64 - 50).abs() <= 1);
    }

    #[test]
    fn test_resize_never_upscales() {
        let data = png_image(40, 20);
        let cfg = config(
            Some(ResizeConfig {
                max_width: 100,
                max_height: 100,
            }),
            None,
        );

        let (_, out) = transform_image("small.png", &data, &cfg).unwrap();
        assert_eq!(decode(&out).dimensions(), (40, 20));
    }

    #[test]
    fn test_force_format_renames_and_reencodes() {
        let data = png_image(10, 10);
        let cfg = config(
            None,
            Some(ForceFormatConfig {
                codec: ImageCodec::Webp,
                extension: "webp".to_string(),
                color_mode: ColorMode::Rgb,
            }),
        );

        let (name, out) = transform_image("photo.PNG", &data, &cfg).unwrap();
        assert_eq!(name, "photo.webp");

        let reader = ImageReader::new(Cursor::new(&out[..]))
            .with_guessed_format()
            .unwrap();
        assert_eq!(reader.format(), Some(ImageFormat::WebP));
    }

    #[test]
    fn test_plain_reencode_keeps_container() {
        let data = png_image(10, 10);
        let cfg = config(None, None);

        let (name, out) = transform_image("plain.png", &data, &cfg).unwrap();
        assert_eq!(name, "plain.png");

        let reader = ImageReader::new(Cursor::new(&out[..]))
            .with_guessed_format()
            .unwrap();
        assert_eq!(reader.format(), Some(ImageFormat::Png));
    }

    #[test]
    fn test_garbage_content_fails_decode() {
        let cfg = config(None, None);
        assert!(matches!(
            transform_image("bad.png", b"not an image", &cfg),
            Err(MediaValidationError::ImageProcessing(_))
        ));
    }
}
