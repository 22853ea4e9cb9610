//! Image file loading and saving at the CLI boundary.
//!
//! Formats come from the `image` crate (PNG, PPM/PNM, JPEG, ...); everything
//! is normalized to RGB8 on the way in and dispatched on the output path's
//! extension on the way out.

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::pixels::PixelBuffer;

/// Load an image file and convert it to an RGB8 pixel buffer.
pub fn load_rgb(path: &Path) -> Result<PixelBuffer> {
    let img = image::open(path)
        .with_context(|| format!("failed to load image {}", path.display()))?
        .to_rgb8();
    let (width, height) = img.dimensions();
    PixelBuffer::from_raw_rgb(width, height, img.as_raw())
        .with_context(|| format!("inconsistent pixel data in {}", path.display()))
}

/// Write a pixel buffer as an image file; the format follows the extension.
pub fn save_rgb(path: &Path, image: &PixelBuffer) -> Result<()> {
    let img = image::RgbImage::from_raw(image.width(), image.height(), image.to_raw_rgb())
        .context("failed to create image buffer")?;
    img.save(path)
        .with_context(|| format!("failed to save {}", path.display()))?;
    Ok(())
}
