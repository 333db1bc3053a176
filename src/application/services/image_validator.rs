//! Confirms decoded attachment bytes are a displayable raster image.

use bytes::Bytes;
use tracing::debug;

use crate::domain::errors::ResolveError;

const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

/// Fully decodes `bytes` to check structure, then returns them untouched.
///
/// # Errors
/// Returns `InvalidImage` for unknown formats, truncated data or zero-sized
/// images.
pub fn validate_image(bytes: Bytes) -> Result<Bytes, ResolveError> {
    if matches!(image::guess_format(&bytes), Ok(image::ImageFormat::Jpeg)) && !has_jpeg_eoi(&bytes) {
        return Err(ResolveError::invalid_image("JPEG is missing its end-of-image marker"));
    }

    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| ResolveError::invalid_image(format!("Failed to decode image: {e}")))?;

    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(ResolveError::invalid_image("image has no pixels"));
    }

    debug!(
        width = decoded.width(),
        height = decoded.height(),
        size = bytes.len(),
        "Attachment decoded as image"
    );
    Ok(bytes)
}

/// The decoder tolerates a missing EOI, so it is checked separately.
/// Trailing zero padding after the marker is allowed.
fn has_jpeg_eoi(bytes: &[u8]) -> bool {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    bytes[..end].ends_with(&JPEG_EOI)
}

/// Runs [`validate_image`] on the blocking pool.
///
/// # Errors
/// Returns `InvalidImage` if validation fails or the task panics.
pub async fn validate_image_blocking(bytes: Bytes) -> Result<Bytes, ResolveError> {
    tokio::task::spawn_blocking(move || validate_image(bytes))
        .await
        .map_err(|e| ResolveError::invalid_image(format!("Decode task panicked: {e}")))?
}

/// File extension matching the image format, for saving to disk.
#[must_use]
pub fn image_extension(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Jpeg) => "jpg",
        Ok(image::ImageFormat::Png) => "png",
        Ok(image::ImageFormat::WebP) => "webp",
        Ok(image::ImageFormat::Gif) => "gif",
        _ => "bin",
    }
}
