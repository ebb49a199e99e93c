//! Picture preview codec.
//!
//! # Responsibility
//! - Decode base64 PNG/JPEG payloads and produce downsized previews.
//! - Apply the soft-fail policy: a malformed picture is dropped, never fatal.
//!
//! # Invariants
//! - Previews keep the source aspect ratio and container format.
//! - The longest preview side equals `max_dimension_px` (never 0).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Cursor;

/// Longest preview side used when the caller does not configure one.
pub const DEFAULT_PREVIEW_MAX_PX: u32 = 50;

pub type PictureResult<T> = Result<T, PictureError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PictureError {
    /// Payload is not base64, not an image, or not PNG/JPEG.
    InvalidImage(String),
    /// Preview could not be encoded back into the source format.
    Encode(String),
}

impl Display for PictureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidImage(message) => write!(f, "invalid image: {message}"),
            Self::Encode(message) => write!(f, "failed to encode preview: {message}"),
        }
    }
}

impl Error for PictureError {}

/// Picture/preview pair ready to be persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredPicture {
    pub picture: Option<String>,
    pub preview: Option<String>,
}

/// Produces a base64 preview whose longest side is `max_dimension_px`.
pub fn make_preview(encoded_image: &str, max_dimension_px: u32) -> PictureResult<String> {
    let bytes = STANDARD
        .decode(encoded_image.trim())
        .map_err(|err| PictureError::InvalidImage(format!("invalid base64: {err}")))?;

    let format = image::guess_format(&bytes)
        .map_err(|err| PictureError::InvalidImage(err.to_string()))?;
    if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
        return Err(PictureError::InvalidImage(format!(
            "unsupported picture format {format:?}"
        )));
    }

    let source = image::load_from_memory_with_format(&bytes, format)
        .map_err(|err| PictureError::InvalidImage(err.to_string()))?;
    let (width, height) = preview_dimensions(source.width(), source.height(), max_dimension_px);
    let preview = source.resize_exact(width, height, FilterType::Nearest);

    let encoded = encode(preview, format)?;
    Ok(STANDARD.encode(encoded))
}

/// Turns a caller-supplied picture into the pair stored next to an entity.
///
/// The picture is kept exactly as given. Blank pictures clear both fields.
/// Malformed pictures are logged and also clear both fields instead of
/// failing the surrounding write.
pub fn prepare_picture(picture: Option<&str>, max_dimension_px: u32) -> StoredPicture {
    let Some(picture) = picture.filter(|value| !value.trim().is_empty()) else {
        return StoredPicture::default();
    };

    match make_preview(picture, max_dimension_px) {
        Ok(preview) => StoredPicture {
            picture: Some(picture.to_string()),
            preview: Some(preview),
        },
        Err(err) => {
            warn!("event=picture_preview module=picture status=error error={err}");
            StoredPicture::default()
        }
    }
}

fn preview_dimensions(width: u32, height: u32, max_dimension_px: u32) -> (u32, u32) {
    let target = f64::from(max_dimension_px.max(1));
    let longest = f64::from(width.max(height).max(1));
    let scale = longest / target;
    let scaled = |side: u32| ((f64::from(side) / scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

fn encode(preview: DynamicImage, format: ImageFormat) -> PictureResult<Vec<u8>> {
    // JPEG has no alpha channel.
    let preview = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(preview.to_rgb8()),
        _ => preview,
    };
    let mut buffer = Cursor::new(Vec::new());
    preview
        .write_to(&mut buffer, format)
        .map_err(|err| PictureError::Encode(err.to_string()))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::{make_preview, prepare_picture, preview_dimensions, PictureError};
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn encoded_image(width: u32, height: u32, format: ImageFormat) -> String {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, [200, 40, 40].into()));
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, format).unwrap();
        STANDARD.encode(buffer.into_inner())
    }

    fn decoded_size(encoded: &str) -> (u32, u32) {
        let bytes = STANDARD.decode(encoded).unwrap();
        let image = image::load_from_memory(&bytes).unwrap();
        (image.width(), image.height())
    }

    #[test]
    fn preview_dimensions_keep_aspect_ratio() {
        assert_eq!(preview_dimensions(200, 100, 50), (50, 25));
        assert_eq!(preview_dimensions(100, 400, 50), (13, 50));
        assert_eq!(preview_dimensions(1000, 1, 50), (50, 1));
    }

    #[test]
    fn png_preview_fits_longest_side() {
        let preview = make_preview(&encoded_image(120, 60, ImageFormat::Png), 50).unwrap();
        assert_eq!(decoded_size(&preview), (50, 25));
    }

    #[test]
    fn jpeg_preview_fits_longest_side() {
        let preview = make_preview(&encoded_image(40, 80, ImageFormat::Jpeg), 20).unwrap();
        assert_eq!(decoded_size(&preview), (10, 20));
    }

    #[test]
    fn malformed_payload_is_invalid_image() {
        let err = make_preview("definitely not base64 !!", 50).unwrap_err();
        assert!(matches!(err, PictureError::InvalidImage(_)));

        let not_an_image = STANDARD.encode(b"plain text bytes");
        let err = make_preview(&not_an_image, 50).unwrap_err();
        assert!(matches!(err, PictureError::InvalidImage(_)));
    }

    #[test]
    fn prepare_picture_soft_fails_to_empty_pair() {
        let stored = prepare_picture(Some("%%%"), 50);
        assert_eq!(stored.picture, None);
        assert_eq!(stored.preview, None);

        let stored = prepare_picture(Some("   "), 50);
        assert_eq!(stored.picture, None);

        let picture = encoded_image(10, 10, ImageFormat::Png);
        let stored = prepare_picture(Some(&picture), 50);
        assert_eq!(stored.picture.as_deref(), Some(picture.as_str()));
        assert!(stored.preview.is_some());
    }
}
