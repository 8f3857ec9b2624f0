//! JPEG decoding and resizing

use crate::error::{PreviewError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::ImageFormat;

/// Smallest preview dimension the service will render.
pub const MIN_DIMENSION: u32 = 128;

/// Decode `bytes` as JPEG, resize to exactly `width`x`height` with a
/// Lanczos filter, and re-encode as JPEG.
pub fn render_preview(bytes: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
        .map_err(|err| PreviewError::InvalidImage(err.to_string()))?;

    let resized = img.resize_exact(width, height, FilterType::Lanczos3);

    let mut out = Vec::new();
    resized
        .write_with_encoder(JpegEncoder::new_with_quality(&mut out, 100))
        .map_err(|err| PreviewError::InvalidImage(err.to_string()))?;
    Ok(out)
}

/// Encode a small gradient JPEG, used as upstream payload in tests.
#[cfg(test)]
pub(crate) fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut out = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_with_encoder(JpegEncoder::new_with_quality(&mut out, 90))
        .unwrap();
    out
}
