//! Circular logo badges
//!
//! A badge is a logo fitted into a circle with a solid ring around it. All
//! drawing happens at `quality_factor` times the requested size and is
//! downscaled once at the end so the circle edges come out antialiased.

use crate::color::ColorSpec;
use crate::raster;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;
use imageproc::filter::gaussian_blur_f32;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest working canvas side, in pixels, the compositor will allocate.
const MAX_INTERNAL_SIDE: u32 = 16_384;

/// Weights of the 5x5 "smooth more" kernel; the centre dominates.
const SMOOTH_KERNEL: [[u32; 5]; 5] = [
    [1, 1, 1, 1, 1],
    [1, 5, 5, 5, 1],
    [1, 5, 44, 5, 1],
    [1, 5, 5, 5, 1],
    [1, 1, 1, 1, 1],
];
const SMOOTH_KERNEL_SUM: u32 = 100;

/// Badge geometry and colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgeOptions {
    /// Diameter of the logo circle, excluding the ring
    pub diameter: u32,
    /// Ring thickness in pixels
    pub border: u32,
    /// Ring color
    pub border_color: ColorSpec,
    /// Fill behind the logo
    pub background_color: ColorSpec,
    /// Oversampling factor used while drawing
    pub quality_factor: u32,
}

impl Default for BadgeOptions {
    fn default() -> Self {
        Self {
            diameter: 150,
            border: 2,
            border_color: ColorSpec::named("black"),
            background_color: ColorSpec::named("white"),
            quality_factor: 4,
        }
    }
}

impl BadgeOptions {
    /// Side length of the finished badge.
    pub fn output_side(&self) -> u32 {
        self.diameter + 2 * self.border
    }
}

/// Reasons a badge could not be produced
#[derive(Debug, Error)]
pub enum BadgeError {
    /// Source image has no pixels
    #[error("source image is empty")]
    EmptySource,

    /// Requested diameter is zero
    #[error("badge diameter must be positive")]
    ZeroDiameter,

    /// Quality factor is zero
    #[error("quality factor must be positive")]
    ZeroQualityFactor,

    /// Working canvas would be unreasonably large
    #[error("working canvas of {0}px exceeds the {MAX_INTERNAL_SIDE}px limit")]
    Oversized(u64),

    /// Source file could not be loaded
    #[error("cannot load {}: {reason}", .path.display())]
    Load {
        /// File that failed
        path: PathBuf,
        /// Loader message
        reason: String,
    },
}

/// Build a circular badge from `logo`.
///
/// Returns `None` when any stage fails; the failure is logged and callers
/// should carry on without a logo overlay.
pub fn make_badge(logo: &DynamicImage, options: &BadgeOptions) -> Option<RgbaImage> {
    match compose(logo, options) {
        Ok(badge) => Some(badge),
        Err(err) => {
            tracing::warn!(error = %err, "Failed to build logo badge");
            None
        }
    }
}

/// Load `path` and build a badge from it, with the same failure policy as
/// [`make_badge`].
pub fn make_badge_from_path(path: &Path, options: &BadgeOptions) -> Option<RgbaImage> {
    let logo = match raster::load_image(path) {
        Ok(logo) => logo,
        Err(err) => {
            let err = BadgeError::Load {
                path: path.to_path_buf(),
                reason: err.to_string(),
            };
            tracing::warn!(error = %err, "Failed to build logo badge");
            return None;
        }
    };
    make_badge(&logo, options)
}

/// Run the full badge pipeline, surfacing the first failing stage.
pub fn compose(logo: &DynamicImage, options: &BadgeOptions) -> Result<RgbaImage, BadgeError> {
    if logo.width() == 0 || logo.height() == 0 {
        return Err(BadgeError::EmptySource);
    }
    if options.diameter == 0 {
        return Err(BadgeError::ZeroDiameter);
    }
    if options.quality_factor == 0 {
        return Err(BadgeError::ZeroQualityFactor);
    }

    let qf = options.quality_factor;
    let wanted = (u64::from(options.diameter) + 2 * u64::from(options.border)) * u64::from(qf);
    if wanted > u64::from(MAX_INTERNAL_SIDE) {
        return Err(BadgeError::Oversized(wanted));
    }

    let internal = options.diameter * qf;
    let internal_border = options.border * qf;
    let background = options.background_color.to_rgba();
    let border = options.border_color.to_rgba();

    let centered = fit_centered(logo, internal);
    let mask = soft_circle_mask(internal, qf as f32 / 2.0);
    let circular = apply_mask(&centered, &mask);

    let mut backed = RgbaImage::new(internal, internal);
    fill_circle(&mut backed, 0, background);
    imageops::overlay(&mut backed, &circular, 0, 0);

    let full = internal + 2 * internal_border;
    let mut canvas = RgbaImage::new(full, full);
    fill_circle(&mut canvas, 0, border);
    fill_circle(&mut canvas, internal_border, background);
    imageops::overlay(
        &mut canvas,
        &backed,
        i64::from(internal_border),
        i64::from(internal_border),
    );

    let smoothed = smooth_more(&canvas);
    let side = options.output_side();
    Ok(imageops::resize(&smoothed, side, side, FilterType::Lanczos3))
}

/// Scale `logo` to fit a `side` square (aspect preserved) and center it on a
/// transparent canvas.
fn fit_centered(logo: &DynamicImage, side: u32) -> RgbaImage {
    let scaled = logo.resize(side, side, FilterType::Lanczos3).to_rgba8();
    let (x, y) = raster::centered_offset((side, side), scaled.dimensions());

    let mut canvas = RgbaImage::new(side, side);
    imageops::replace(&mut canvas, &scaled, x, y);
    canvas
}

/// Filled circle mask spanning the square, edge softened with a Gaussian blur.
fn soft_circle_mask(side: u32, sigma: f32) -> GrayImage {
    let mut mask = GrayImage::new(side, side);
    let radius = (side / 2) as i32;
    draw_filled_circle_mut(&mut mask, (radius, radius), radius, Luma([255u8]));
    gaussian_blur_f32(&mask, sigma)
}

/// Scale each pixel's alpha by the mask value.
fn apply_mask(image: &RgbaImage, mask: &GrayImage) -> RgbaImage {
    let mut out = image.clone();
    for (pixel, m) in out.pixels_mut().zip(mask.pixels()) {
        pixel[3] = ((u32::from(pixel[3]) * u32::from(m[0]) + 127) / 255) as u8;
    }
    out
}

/// Fill a circle inset by `inset` pixels from every side of the canvas.
fn fill_circle(canvas: &mut RgbaImage, inset: u32, color: Rgba<u8>) {
    let side = canvas.width();
    let radius = (side / 2).saturating_sub(inset) as i32;
    let center = (side / 2) as i32;
    if radius > 0 {
        draw_filled_circle_mut(canvas, (center, center), radius, color);
    }
}

/// Apply the 5x5 smoothing kernel with clamped edges.
fn smooth_more(image: &RgbaImage) -> RgbaImage {
    let (w, h) = image.dimensions();
    let mut out = RgbaImage::new(w, h);

    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u32; 4];
            for (ky, row) in SMOOTH_KERNEL.iter().enumerate() {
                let sy = (y as i64 + ky as i64 - 2).clamp(0, h as i64 - 1) as u32;
                for (kx, weight) in row.iter().enumerate() {
                    let sx = (x as i64 + kx as i64 - 2).clamp(0, w as i64 - 1) as u32;
                    let p = image.get_pixel(sx, sy);
                    for (slot, channel) in acc.iter_mut().zip(p.0) {
                        *slot += u32::from(channel) * weight;
                    }
                }
            }
            let px = acc.map(|v| ((v + SMOOTH_KERNEL_SUM / 2) / SMOOTH_KERNEL_SUM).min(255) as u8);
            out.put_pixel(x, y, Rgba(px));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn red_logo(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([255, 0, 0])))
    }

    #[test]
    fn test_badge_side_is_diameter_plus_borders() {
        for (d, b) in [(150, 2), (40, 5), (33, 0), (10, 1)] {
            let options = BadgeOptions {
                diameter: d,
                border: b,
                ..Default::default()
            };
            let badge = make_badge(&red_logo(64, 32), &options).unwrap();
            assert_eq!(badge.dimensions(), (d + 2 * b, d + 2 * b));
        }
    }

    #[test]
    fn test_badge_is_circular() {
        let options = BadgeOptions {
            diameter: 60,
            border: 4,
            ..Default::default()
        };
        let badge = make_badge(&red_logo(100, 100), &options).unwrap();

        // Corners stay transparent
        assert_eq!(badge.get_pixel(0, 0)[3], 0);
        assert_eq!(badge.get_pixel(67, 67)[3], 0);

        // Center carries the logo
        let center = badge.get_pixel(34, 34);
        assert!(center[0] > 200 && center[1] < 50 && center[3] > 250, "{center:?}");

        // Ring is dark and opaque at the top edge midpoint
        let ring = badge.get_pixel(34, 1);
        assert!(ring[0] < 100 && ring[3] > 100, "{ring:?}");
    }

    #[test]
    fn test_wide_logo_keeps_background_above_and_below() {
        let options = BadgeOptions {
            diameter: 80,
            border: 0,
            background_color: ColorSpec::named("white"),
            ..Default::default()
        };
        // 4:1 logo only fills a horizontal stripe of the circle
        let badge = make_badge(&red_logo(200, 50), &options).unwrap();
        let above = badge.get_pixel(40, 12);
        assert!(above[0] > 200 && above[1] > 200 && above[2] > 200, "{above:?}");
    }

    #[test]
    fn test_invalid_requests_yield_none() {
        let zero = BadgeOptions {
            diameter: 0,
            ..Default::default()
        };
        assert!(make_badge(&red_logo(10, 10), &zero).is_none());

        let no_quality = BadgeOptions {
            quality_factor: 0,
            ..Default::default()
        };
        assert!(make_badge(&red_logo(10, 10), &no_quality).is_none());

        assert!(matches!(
            compose(&red_logo(0, 0), &BadgeOptions::default()),
            Err(BadgeError::EmptySource)
        ));

        let huge = BadgeOptions {
            diameter: 10_000,
            ..Default::default()
        };
        assert!(matches!(
            compose(&red_logo(10, 10), &huge),
            Err(BadgeError::Oversized(_))
        ));
    }

    #[test]
    fn test_badge_from_unreadable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(make_badge_from_path(&path, &BadgeOptions::default()).is_none());
    }

    #[test]
    fn test_smooth_more_preserves_flat_regions() {
        let flat = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]));
        assert_eq!(smooth_more(&flat), flat);
    }
}
