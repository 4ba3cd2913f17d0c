//! Generate a few styled QR codes with a badge and save them to ./out
//!
//! Usage: cargo run --example generate_qr -- [logo.png]

use image::{Rgb, RgbImage};
use qrbadge::{FillMode, GeneratorOptions, ModuleShape, QrGenerator, StyleOptions};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let mut generator = QrGenerator::new(GeneratorOptions::default(), None)?;

    // Use the logo given on the command line, or draw a placeholder
    match std::env::args().nth(1) {
        Some(path) => generator.set_logo_by_path(path)?,
        None => {
            let logo = RgbImage::from_fn(96, 96, |x, y| {
                Rgb([(x * 2) as u8, (y * 2) as u8, 180])
            });
            generator.set_logo(&logo.into());
        }
    }

    let generated = generator.generate("https://example.com").await?;
    println!("✓ Plain QR code saved to {}", generated.path.display());

    // Same badge on a rounded, gradient-filled raster
    let styled = QrGenerator::new(
        GeneratorOptions {
            style: StyleOptions {
                shape: ModuleShape::Rounded,
                fill: FillMode::VerticalGradient,
                gradient_color: Some("#6a0dad".parse()?),
                ..StyleOptions::default()
            },
            verify: true,
            ..GeneratorOptions::default()
        },
        None,
    )?;
    let generated = styled
        .generate_with_badge("https://example.com/styled", generator.badge())
        .await?;
    println!("✓ Styled QR code saved to {}", generated.path.display());
    println!("  Decodes back: {:?}", generated.verified);

    Ok(())
}
