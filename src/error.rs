//! Error types for qrbadge operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using qrbadge's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for qrbadge operations
#[derive(Error, Debug)]
pub enum Error {
    /// A referenced file does not exist
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// The file exists but is not a decodable image
    #[error("Invalid image {}: {reason}", .path.display())]
    InvalidImage {
        /// Path that failed to decode
        path: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// Metadata insert failed (callers treat this as non-fatal)
    #[error("Failed to write metadata: {0}")]
    MetadataWrite(String),

    /// QR code encoding failed
    #[error("Failed to encode QR code: {0}")]
    QrEncode(String),

    /// QR code decoding failed
    #[error("Failed to decode QR code: {0}")]
    QrDecode(String),

    /// No QR code found in image
    #[error("No QR code found in image")]
    NoQrCodeFound,

    /// Logo overlay covers too much of the symbol to stay scannable
    #[error("Logo overlay covers {pct:.1}% of the symbol (limit {max_pct:.1}%)", pct = .ratio * 100.0, max_pct = .limit * 100.0)]
    OverlayTooLarge {
        /// Overlay area divided by symbol area
        ratio: f64,
        /// Configured maximum ratio
        limit: f64,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    Image(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

impl From<qrcode::types::QrError> for Error {
    fn from(e: qrcode::types::QrError) -> Self {
        Error::QrEncode(e.to_string())
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::Database(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_message_uses_percentages() {
        let err = Error::OverlayTooLarge {
            ratio: 0.35,
            limit: 0.28,
        };
        assert_eq!(
            err.to_string(),
            "Logo overlay covers 35.0% of the symbol (limit 28.0%)"
        );
    }

    #[test]
    fn test_missing_file_message() {
        let err = Error::MissingFile(PathBuf::from("logo.png"));
        assert_eq!(err.to_string(), "File not found: logo.png");
    }
}
