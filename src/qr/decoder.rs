//! QR code decoder using rqrr, used to check that generated rasters scan

use crate::error::{Error, Result};
use crate::qr::QrPayload;
use image::{DynamicImage, GrayImage};

/// QR code decoder
pub struct QrDecoder {}

impl QrDecoder {
    /// Create a new QR decoder with default settings
    pub fn new() -> Self {
        Self {}
    }

    /// Decode the first QR code found in an image
    pub fn decode(&self, img: &DynamicImage) -> Result<QrPayload> {
        self.decode_gray(&img.to_luma8())
    }

    /// Decode the first QR code found in a grayscale image
    pub fn decode_gray(&self, img: &GrayImage) -> Result<QrPayload> {
        let mut prepared = rqrr::PreparedImage::prepare(img.clone());
        let grids = prepared.detect_grids();

        let Some(grid) = grids.first() else {
            return Err(Error::NoQrCodeFound);
        };

        match grid.decode() {
            Ok((meta, content)) => {
                tracing::debug!(
                    "Decoded QR: version={:?}, ecc_level={:?}, length={}",
                    meta.version,
                    meta.ecc_level,
                    content.len()
                );

                Ok(QrPayload::from_bytes(content.into_bytes()))
            }
            Err(e) => Err(Error::QrDecode(format!("Decode failed: {:?}", e))),
        }
    }

    /// Decode `img` and report whether it carries exactly `expected`.
    ///
    /// Decoder failures count as a mismatch and are logged.
    pub fn matches(&self, img: &DynamicImage, expected: &str) -> bool {
        match self.decode(img) {
            Ok(payload) => payload.as_str() == Some(expected),
            Err(err) => {
                tracing::warn!(error = %err, "Generated QR could not be decoded");
                false
            }
        }
    }
}

impl Default for QrDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::QrRasterBuilder;

    #[test]
    fn test_blank_image_has_no_code() {
        let blank = DynamicImage::ImageLuma8(GrayImage::from_pixel(200, 200, image::Luma([255])));
        assert!(matches!(
            QrDecoder::new().decode(&blank),
            Err(Error::NoQrCodeFound)
        ));
        assert!(!QrDecoder::new().matches(&blank, "anything"));
    }

    #[test]
    fn test_matches_exact_text() {
        let raster = QrRasterBuilder::new().build_minimal("Hello, QR!").unwrap();
        let img = DynamicImage::ImageRgb8(raster);
        let decoder = QrDecoder::new();
        assert!(decoder.matches(&img, "Hello, QR!"));
        assert!(!decoder.matches(&img, "Hello, QR"));
    }
}
