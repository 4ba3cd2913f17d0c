//! qrbadge - styled QR codes with a circular logo badge in the middle
//!
//! This library renders QR codes at high error correction, pastes a
//! round, bordered badge made from a logo onto the centre of the symbol,
//! and optionally records each generated code in a SQLite table.
//!
//! # Features
//!
//! - **Styled rasters**: module shapes and colour fills (solid, gradients, image masks)
//! - **Logo badges**: anti-aliased circular crops with a border ring
//! - **Metadata**: one row per generated code, keyed by the UUID in the file name
//! - **Verification**: generated images can be decoded back and compared
//!
//! # Example
//!
//! ```no_run
//! use qrbadge::{GeneratorOptions, QrGenerator};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut generator = QrGenerator::new(GeneratorOptions::default(), None)?;
//!     generator.set_logo_by_path("logo.png")?;
//!
//!     let generated = generator.generate("https://example.com").await?;
//!     println!("Saved {}", generated.path.display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod badge;
pub mod color;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod metadata;
pub mod output;
pub mod qr;
pub mod raster;

// Re-exports for convenience
pub use error::{Error, Result};

pub use badge::{BadgeError, BadgeOptions, make_badge, make_badge_from_path};
pub use color::{ColorSpec, normalize};
pub use config::{LogRotation, LoggingOptions, MetadataOptions, OutputOptions, QrBadgeConfig};
pub use generator::{GeneratedQr, GeneratorOptions, QrGenerator};
pub use metadata::{MetadataSink, QrRecord, SqliteMetadataStore};
pub use qr::{FillMode, ModuleShape, QrDecoder, QrPayload, QrRasterBuilder, StyleOptions};
