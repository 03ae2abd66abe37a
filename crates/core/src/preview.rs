//! Preview rendering: fit a generated image inside a square bounding box.
//!
//! The resize is "contain" style: the whole image stays visible, the aspect
//! ratio is kept, nothing is cropped and no padding is added. The output is
//! re-encoded in the same format the input was decoded from.
//!
//! Everything here is CPU-bound and synchronous. Async callers should run
//! [`render_preview`] on the blocking pool.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};

/// Longest edge of a preview, in pixels.
pub const PREVIEW_MAX_DIMENSION: u32 = 512;

/// Errors raised while turning a render into a preview.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// The input bytes are not an image in a supported format.
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// The resized image could not be written back out.
    #[error("Failed to encode {format:?} preview: {source}")]
    Encode {
        format: ImageFormat,
        #[source]
        source: image::ImageError,
    },
}

/// An encoded preview and its final dimensions.
#[derive(Debug, Clone)]
pub struct Preview {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

/// Decode `source`, fit it inside `max_dimension × max_dimension`, and
/// re-encode it in its original format.
///
/// Images already inside the box keep their size.
pub fn render_preview(source: &[u8], max_dimension: u32) -> Result<Preview, PreviewError> {
    let format = image::guess_format(source).map_err(PreviewError::Decode)?;
    let img = image::load_from_memory_with_format(source, format).map_err(PreviewError::Decode)?;

    let (width, height) = img.dimensions();
    let fitted = if width <= max_dimension && height <= max_dimension {
        img
    } else {
        img.resize(max_dimension, max_dimension, FilterType::Triangle)
    };

    let (width, height) = fitted.dimensions();
    let data = encode(&fitted, format)?;

    Ok(Preview {
        data,
        width,
        height,
        format,
    })
}

fn encode(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, PreviewError> {
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, format)
        .map_err(|source| PreviewError::Encode { format, source })?;
    Ok(cursor.into_inner())
}
