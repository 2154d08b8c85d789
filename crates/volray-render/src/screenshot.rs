//! Saving rendered frames to disk.

use std::path::Path;

use image::{ImageBuffer, Rgba};
use thiserror::Error;

/// Error type for screenshot operations.
#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error("failed to save image: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("pixel buffer of {actual} bytes does not match {width}x{height}")]
    WrongSize {
        width: u32,
        height: u32,
        actual: usize,
    },
}

/// Saves tightly packed RGBA pixels (as returned by
/// `RenderEngine::read_pixels`) as a PNG.
///
/// wgpu uses a top-left origin, so rows are written as-is.
pub fn save_png(
    path: impl AsRef<Path>,
    pixels: &[u8],
    width: u32,
    height: u32,
) -> Result<(), ScreenshotError> {
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_raw(width, height, pixels.to_vec()).ok_or(
            ScreenshotError::WrongSize {
                width,
                height,
                actual: pixels.len(),
            },
        )?;
    img.save_with_format(path.as_ref(), image::ImageFormat::Png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_size_rejected() {
        let err = save_png("/nonexistent/never-written.png", &[0; 5], 2, 2);
        assert!(matches!(err, Err(ScreenshotError::WrongSize { .. })));
    }
}
