//! Shared raster helpers: validated image loading and centered alpha pastes

use crate::error::{Error, Result};
use image::imageops;
use image::{DynamicImage, ImageReader, RgbImage, RgbaImage};
use std::path::Path;

/// Load an image from disk, distinguishing a missing path from undecodable content.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    if !path.exists() {
        return Err(Error::MissingFile(path.to_path_buf()));
    }

    let invalid = |reason: String| Error::InvalidImage {
        path: path.to_path_buf(),
        reason,
    };

    ImageReader::open(path)
        .map_err(|e| invalid(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| invalid(e.to_string()))?
        .decode()
        .map_err(|e| invalid(e.to_string()))
}

/// Top-left offset that centers an `inner` image on an `outer` one.
///
/// Negative when `inner` is larger, so oversize overlays stay centered.
pub fn centered_offset(outer: (u32, u32), inner: (u32, u32)) -> (i64, i64) {
    (
        (i64::from(outer.0) - i64::from(inner.0)) / 2,
        (i64::from(outer.1) - i64::from(inner.1)) / 2,
    )
}

/// Alpha-blend `top` onto the center of an opaque RGB `base`.
///
/// Pixels falling outside `base` are clipped.
pub fn paste_centered(base: &mut RgbImage, top: &RgbaImage) {
    let (x, y) = centered_offset(base.dimensions(), top.dimensions());

    let mut canvas = DynamicImage::ImageRgb8(std::mem::take(base)).into_rgba8();
    imageops::overlay(&mut canvas, top, x, y);
    *base = DynamicImage::ImageRgba8(canvas).into_rgb8();
}
