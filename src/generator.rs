//! QR generation orchestrator
//!
//! [`QrGenerator`] owns the output directory and the currently loaded logo
//! badge. Each [`generate`](QrGenerator::generate) call encodes the text,
//! pastes the badge in the middle, records metadata when a sink is attached,
//! and writes `<uuid>_<YYYYMMDD_HHMMSS>.png`.

use crate::badge::{self, BadgeOptions};
use crate::config::{MetadataOptions, QrBadgeConfig};
use crate::error::{Error, Result};
use crate::metadata::{MetadataSink, QrRecord};
use crate::qr::{QrDecoder, QrRasterBuilder, StyleOptions};
use crate::raster;
use chrono::{DateTime, Local};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Everything a [`QrGenerator`] needs besides its metadata sink
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Directory receiving the PNG files
    pub output_dir: PathBuf,
    /// Side in pixels the badge is resized to before pasting
    pub overlay_size: u32,
    /// Largest overlay area accepted, as a share of the symbol area
    pub max_overlay_ratio: f64,
    /// Reject oversized overlays instead of warning
    pub strict_overlay: bool,
    /// Decode each written image and compare it with the input
    pub verify: bool,
    /// Badge geometry used when loading a logo
    pub badge: BadgeOptions,
    /// Raster styling
    pub style: StyleOptions,
    /// Author and description recorded with each code
    pub metadata: MetadataOptions,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self::from(&QrBadgeConfig::default())
    }
}

impl From<&QrBadgeConfig> for GeneratorOptions {
    fn from(config: &QrBadgeConfig) -> Self {
        Self {
            output_dir: config.output.dir.clone(),
            overlay_size: config.output.overlay_size,
            max_overlay_ratio: config.output.max_overlay_ratio,
            strict_overlay: config.output.strict_overlay,
            verify: config.output.verify,
            badge: config.badge.clone(),
            style: config.style.clone(),
            metadata: config.metadata.clone(),
        }
    }
}

/// Outcome of one generation
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedQr {
    /// Identifier of the code, also recorded as metadata id
    pub id: Uuid,
    /// Written PNG
    pub path: PathBuf,
    /// Encoded text
    pub text: String,
    /// Generation time
    pub created_at: DateTime<Local>,
    /// Whether a badge was pasted onto the raster
    pub badge_applied: bool,
    /// Overlay area over symbol area, when a badge was pasted
    pub overlay_ratio: Option<f64>,
    /// Whether a metadata row was written
    pub metadata_stored: bool,
    /// Decode check result, when verification is enabled
    pub verified: Option<bool>,
}

/// Generates badge-decorated QR codes into an output directory
pub struct QrGenerator {
    options: GeneratorOptions,
    builder: QrRasterBuilder,
    sink: Option<Box<dyn MetadataSink>>,
    badge: Option<RgbaImage>,
}

impl QrGenerator {
    /// Create a generator, creating the output directory if needed.
    ///
    /// The sink is used as-is; opening and closing it is the caller's job.
    pub fn new(options: GeneratorOptions, sink: Option<Box<dyn MetadataSink>>) -> Result<Self> {
        std::fs::create_dir_all(&options.output_dir)?;
        Ok(Self {
            options,
            builder: QrRasterBuilder::new(),
            sink,
            badge: None,
        })
    }

    /// Options in effect
    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Output directory
    pub fn output_dir(&self) -> &Path {
        &self.options.output_dir
    }

    /// Load a logo file and turn it into the current badge.
    ///
    /// Fails with [`Error::MissingFile`] or [`Error::InvalidImage`]. If the
    /// image decodes but no badge can be made from it, the previous badge is
    /// kept and a warning is logged.
    pub fn set_logo_by_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let logo = raster::load_image(path)?;
        if self.set_logo(&logo) {
            tracing::info!(path = %path.display(), "Logo loaded");
        }
        Ok(())
    }

    /// Turn an in-memory image into the current badge; returns whether it worked.
    pub fn set_logo(&mut self, logo: &DynamicImage) -> bool {
        match badge::make_badge(logo, &self.options.badge) {
            Some(badge) => {
                self.badge = Some(badge);
                true
            }
            None => {
                tracing::warn!("Logo could not be turned into a badge, keeping previous logo");
                false
            }
        }
    }

    /// Drop the current badge
    pub fn clear_logo(&mut self) {
        self.badge = None;
    }

    /// Whether a badge is loaded
    pub fn has_logo(&self) -> bool {
        self.badge.is_some()
    }

    /// Current badge, at its composed size
    pub fn badge(&self) -> Option<&RgbaImage> {
        self.badge.as_ref()
    }

    /// Generate a code for `text` using the current badge.
    pub async fn generate(&self, text: &str) -> Result<GeneratedQr> {
        self.generate_with_badge(text, self.badge.as_ref()).await
    }

    /// Generate a code for `text`, pasting `badge` when given.
    pub async fn generate_with_badge(
        &self,
        text: &str,
        badge: Option<&RgbaImage>,
    ) -> Result<GeneratedQr> {
        let id = Uuid::new_v4();
        let created_at = Local::now();

        let raster = self.builder.build_raster(text, &self.options.style)?;
        let symbol_side = raster.symbol_side();
        let mut image = raster.image;

        let mut overlay_ratio = None;
        if let Some(badge) = badge {
            let size = self.options.overlay_size;
            let ratio = overlay_ratio_for(size, symbol_side);
            self.check_overlay(ratio)?;

            let resized = imageops::resize(badge, size, size, FilterType::Lanczos3);
            raster::paste_centered(&mut image, &resized);
            overlay_ratio = Some(ratio);
        }

        let metadata_stored = self.record(id, text, created_at).await;

        let path = self.options.output_dir.join(file_name(id, created_at));
        let image = DynamicImage::ImageRgb8(image);
        image.save(&path)?;

        let verified = self
            .options
            .verify
            .then(|| QrDecoder::new().matches(&image, text));
        if verified == Some(false) {
            tracing::warn!(path = %path.display(), "Generated QR does not decode to its input");
        }

        tracing::info!(%id, path = %path.display(), "QR code generated");

        Ok(GeneratedQr {
            id,
            path,
            text: text.to_string(),
            created_at,
            badge_applied: badge.is_some(),
            overlay_ratio,
            metadata_stored,
            verified,
        })
    }

    fn check_overlay(&self, ratio: f64) -> Result<()> {
        let limit = self.options.max_overlay_ratio;
        if ratio <= limit {
            return Ok(());
        }
        if self.options.strict_overlay {
            return Err(Error::OverlayTooLarge { ratio, limit });
        }
        tracing::warn!(ratio, limit, "Logo overlay may exceed the error correction budget");
        Ok(())
    }

    /// Write the metadata row; failures are logged and reported as `false`.
    async fn record(&self, id: Uuid, text: &str, created_at: DateTime<Local>) -> bool {
        let Some(sink) = self.sink.as_deref() else {
            return false;
        };

        let record = QrRecord {
            id,
            encoded_text: text.to_string(),
            author: self.options.metadata.author.clone(),
            created_at,
            description: self.options.metadata.description.clone(),
        };

        let outcome = match sink.ensure_schema().await {
            Ok(()) => sink.insert(&record).await,
            Err(err) => Err(err),
        };

        match outcome {
            Ok(()) => true,
            Err(err) => {
                let err = match err {
                    Error::MetadataWrite(_) => err,
                    other => Error::MetadataWrite(other.to_string()),
                };
                tracing::error!(%id, error = %err, "Metadata not saved");
                false
            }
        }
    }
}

/// Overlay area over symbol area for a square overlay of side `overlay`.
pub fn overlay_ratio_for(overlay: u32, symbol_side: u32) -> f64 {
    if symbol_side == 0 {
        return f64::INFINITY;
    }
    let o = f64::from(overlay);
    let s = f64::from(symbol_side);
    (o * o) / (s * s)
}

/// `<uuid>_<YYYYMMDD_HHMMSS>.png`
pub fn file_name(id: Uuid, created_at: DateTime<Local>) -> String {
    format!("{id}_{}.png", created_at.format("%Y%m%d_%H%M%S"))
}
