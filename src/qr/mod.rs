//! QR code rendering and verification
//!
//! [`QrRasterBuilder`] turns text into a styled raster; [`QrDecoder`] reads a
//! raster back so generated codes can be checked for scannability.

mod builder;
mod decoder;
pub mod style;

pub use builder::{LOGO_SCALE, QrRaster, QrRasterBuilder, StyleError, overlay_logo};
pub use decoder::QrDecoder;
pub use style::{FillMode, ModuleShape, StyleOptions};

/// A decoded QR code payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrPayload {
    /// The raw decoded data
    pub data: Vec<u8>,
    /// String representation if valid UTF-8
    pub text: Option<String>,
}

impl QrPayload {
    /// Create a new QR payload from raw bytes
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let text = String::from_utf8(data.clone()).ok();
        Self { data, text }
    }

    /// Get the payload as a string, if valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
