//! Styled QR raster builder
//!
//! Encoding always uses the highest error correction level so a logo can
//! cover part of the symbol. Styling failures never abort a build: each
//! fallback step names the [`StyleError`]s it absorbs and the last resort is a
//! plain black-on-white raster.

use crate::error::{Error, Result};
use crate::qr::style::{ColorMask, FillMode, ModuleShape, Neighbors, StyleOptions};
use crate::raster;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode, Version};
use std::path::Path;
use thiserror::Error;

/// Share of the raster side a builder-level logo may take.
pub const LOGO_SCALE: f64 = 0.3;

/// Module size used by the minimal fallback raster.
const FALLBACK_MODULE_SIZE: u32 = 10;

/// Quiet zone, in modules, of the minimal fallback raster.
const FALLBACK_QUIET_ZONE: u32 = 4;

/// Largest raster side the builder will allocate.
const MAX_RASTER_SIDE: u64 = 16_384;

/// A requested style that could not be honored
#[derive(Debug, Error)]
pub enum StyleError {
    /// Image-mask fill requested but the mask could not be used
    #[error("color mask image unavailable: {0}")]
    MaskUnavailable(String),

    /// Module size of zero
    #[error("module size must be positive")]
    InvalidModuleSize,

    /// Resulting raster would be too large
    #[error("raster side of {0}px is too large")]
    RasterTooLarge(u64),
}

/// A rendered symbol together with the geometry it was drawn with
#[derive(Debug, Clone)]
pub struct QrRaster {
    /// Rendered image, quiet zone included
    pub image: RgbImage,
    /// Modules per side of the symbol
    pub modules: usize,
    /// Pixels per module
    pub module_size: u32,
    /// Quiet zone width in modules
    pub quiet_zone: u32,
}

impl QrRaster {
    /// Side in pixels of the symbol itself, quiet zone excluded.
    pub fn symbol_side(&self) -> u32 {
        self.modules as u32 * self.module_size
    }
}

/// Builds QR rasters at error correction level H
#[derive(Debug, Clone, Copy)]
pub struct QrRasterBuilder {
    ecc_level: EcLevel,
}

impl QrRasterBuilder {
    /// Create a builder using the highest error correction level
    pub fn new() -> Self {
        Self {
            ecc_level: EcLevel::H,
        }
    }

    /// Encode `text` into the smallest symbol that fits, growing from
    /// `min_version` when given.
    pub fn encode(&self, text: &str, min_version: Option<i16>) -> Result<QrCode> {
        let Some(min) = min_version else {
            return Ok(QrCode::with_error_correction_level(text, self.ecc_level)?);
        };

        if !(1..=40).contains(&min) {
            return Err(Error::QrEncode(format!(
                "minimum version {min} is outside 1-40"
            )));
        }

        for version in min..=40 {
            match QrCode::with_version(text, Version::Normal(version), self.ecc_level) {
                Ok(code) => return Ok(code),
                Err(QrError::DataTooLong) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(QrError::DataTooLong.into())
    }

    /// Encode `text` and render it with `style`.
    ///
    /// Only encoding failures (e.g. data too long for any version) are
    /// returned; styling problems degrade to a simpler raster.
    pub fn build(&self, text: &str, style: &StyleOptions) -> Result<RgbImage> {
        self.build_raster(text, style).map(|raster| raster.image)
    }

    /// Like [`build`](Self::build), also reporting the geometry actually used.
    pub fn build_raster(&self, text: &str, style: &StyleOptions) -> Result<QrRaster> {
        let code = self.encode(text, style.min_version)?;
        tracing::debug!(
            version = ?code.version(),
            modules = code.width(),
            shape = %style.shape,
            fill = %style.fill,
            "Encoded QR symbol"
        );

        let styled = match render_styled(&code, style, style.fill) {
            Ok(image) => Ok(image),
            Err(StyleError::MaskUnavailable(reason)) => {
                tracing::warn!(%reason, "Image mask unavailable, using solid fill");
                render_styled(&code, style, FillMode::Solid)
            }
            Err(err) => Err(err),
        };

        let mut rendered = match styled {
            Ok(image) => QrRaster {
                image,
                modules: code.width(),
                module_size: style.module_size,
                quiet_zone: style.quiet_zone,
            },
            Err(err) => {
                tracing::warn!(error = %err, "Styled render failed, using plain QR");
                QrRaster {
                    image: render_minimal(&code),
                    modules: code.width(),
                    module_size: FALLBACK_MODULE_SIZE,
                    quiet_zone: FALLBACK_QUIET_ZONE,
                }
            }
        };

        if let Some(path) = &style.logo {
            match raster::load_image(path) {
                Ok(logo) => overlay_logo(&mut rendered.image, &logo),
                Err(err) => tracing::warn!(error = %err, "Skipping QR logo"),
            }
        }

        Ok(rendered)
    }

    /// Encode `text` and render plain black-on-white squares.
    pub fn build_minimal(&self, text: &str) -> Result<RgbImage> {
        Ok(render_minimal(&self.encode(text, None)?))
    }
}

impl Default for QrRasterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Scale `logo` to 30% of the raster side, center it, and paste it (through
/// its alpha channel when it has one).
pub fn overlay_logo(raster: &mut RgbImage, logo: &DynamicImage) {
    let side = ((f64::from(raster.width()) * LOGO_SCALE) as u32).max(1);
    let resized = logo.resize_exact(side, side, FilterType::Lanczos3);
    raster::paste_centered(raster, &resized.to_rgba8());
}

fn render_styled(
    code: &QrCode,
    style: &StyleOptions,
    fill: FillMode,
) -> std::result::Result<RgbImage, StyleError> {
    if style.module_size == 0 {
        return Err(StyleError::InvalidModuleSize);
    }

    let width = code.width();
    let cells = width as u64 + 2 * u64::from(style.quiet_zone);
    let side = cells * u64::from(style.module_size);
    if side > MAX_RASTER_SIDE {
        return Err(StyleError::RasterTooLarge(side));
    }
    let side = side as u32;

    let mask = color_mask(style, fill, side)?;
    let background = style.background.to_rgb();
    let dark: Vec<bool> = code
        .to_colors()
        .into_iter()
        .map(|c| c == qrcode::Color::Dark)
        .collect();

    let mut img = RgbImage::from_pixel(side, side, background);
    let size = style.module_size;
    let offset = style.quiet_zone * size;

    for my in 0..width {
        for mx in 0..width {
            if !dark[my * width + mx] {
                continue;
            }
            let neighbors = Neighbors::of(&dark, width, mx, my);
            let (px, py) = (offset + mx as u32 * size, offset + my as u32 * size);
            paint_module(&mut img, &mask, style.shape, neighbors, (px, py), size);
        }
    }

    Ok(img)
}

fn paint_module(
    img: &mut RgbImage,
    mask: &ColorMask,
    shape: ModuleShape,
    neighbors: Neighbors,
    (px, py): (u32, u32),
    size: u32,
) {
    let (w, h) = img.dimensions();
    for dy in 0..size {
        for dx in 0..size {
            let fx = f64::from(dx) + 0.5;
            let fy = f64::from(dy) + 0.5;
            if shape.covers(neighbors, fx, fy, f64::from(size)) {
                let (x, y) = (px + dx, py + dy);
                img.put_pixel(x, y, mask.sample(x, y, w, h));
            }
        }
    }
}

fn color_mask(
    style: &StyleOptions,
    fill: FillMode,
    side: u32,
) -> std::result::Result<ColorMask, StyleError> {
    let primary = style.color.to_rgb();
    let secondary = style
        .gradient_color
        .as_ref()
        .map(|c| c.to_rgb())
        .unwrap_or(primary);

    Ok(match fill {
        FillMode::Solid => ColorMask::Solid(primary),
        FillMode::RadialGradient => ColorMask::Radial {
            center: primary,
            edge: secondary,
        },
        FillMode::SquareGradient => ColorMask::Square {
            center: primary,
            edge: secondary,
        },
        FillMode::HorizontalGradient => ColorMask::Horizontal {
            left: primary,
            right: secondary,
        },
        FillMode::VerticalGradient => ColorMask::Vertical {
            top: primary,
            bottom: secondary,
        },
        FillMode::ImageMask => {
            let path = style
                .mask_image
                .as_deref()
                .ok_or_else(|| StyleError::MaskUnavailable("no mask image configured".into()))?;
            ColorMask::Image(load_mask(path, side)?)
        }
    })
}

fn load_mask(path: &Path, side: u32) -> std::result::Result<RgbImage, StyleError> {
    let image =
        raster::load_image(path).map_err(|e| StyleError::MaskUnavailable(e.to_string()))?;
    Ok(imageops::resize(
        &image.to_rgb8(),
        side,
        side,
        FilterType::Triangle,
    ))
}

fn render_minimal(code: &QrCode) -> RgbImage {
    code.render::<Rgb<u8>>()
        .dark_color(Rgb([0, 0, 0]))
        .light_color(Rgb([255, 255, 255]))
        .quiet_zone(true)
        .module_dimensions(FALLBACK_MODULE_SIZE, FALLBACK_MODULE_SIZE)
        .build()
}
