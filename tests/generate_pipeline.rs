use std::path::Path;

use image::{Rgb, RgbImage};
use tempfile::TempDir;

use qrbadge::qr::QrDecoder;
use qrbadge::{
    Error, FillMode, GeneratorOptions, ModuleShape, QrGenerator, SqliteMetadataStore, StyleOptions,
};

fn options_in(dir: &TempDir) -> GeneratorOptions {
    GeneratorOptions {
        output_dir: dir.path().join("out"),
        ..GeneratorOptions::default()
    }
}

fn decode_file(path: &Path) -> Option<String> {
    let image = image::open(path).expect("open generated image");
    QrDecoder::new()
        .decode(&image)
        .ok()
        .and_then(|payload| payload.text)
}

fn write_logo(dir: &TempDir) -> std::path::PathBuf {
    let logo = RgbImage::from_fn(64, 48, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            Rgb([220, 30, 30])
        } else {
            Rgb([30, 160, 60])
        }
    });
    let path = dir.path().join("logo.png");
    logo.save(&path).expect("write logo");
    path
}

#[tokio::test]
async fn plain_code_decodes_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let generator = QrGenerator::new(options_in(&dir), None).unwrap();

    let generated = generator.generate("https://example.com").await.unwrap();
    let name = generated.path.file_name().unwrap().to_string_lossy();
    assert!(name.starts_with(&generated.id.to_string()));
    assert!(name.ends_with(".png"));
    assert_eq!(
        decode_file(&generated.path).as_deref(),
        Some("https://example.com")
    );
}

#[tokio::test]
async fn code_with_logo_still_decodes() {
    let dir = tempfile::tempdir().unwrap();
    let logo = write_logo(&dir);

    let mut generator = QrGenerator::new(options_in(&dir), None).unwrap();
    generator.set_logo_by_path(&logo).unwrap();
    assert!(generator.has_logo());

    let generated = generator.generate("https://example.com").await.unwrap();
    assert!(generated.badge_applied);
    assert_eq!(
        decode_file(&generated.path).as_deref(),
        Some("https://example.com")
    );
}

#[tokio::test]
async fn smallest_symbols_decode_with_and_without_logo() {
    let dir = tempfile::tempdir().unwrap();
    let logo = write_logo(&dir);
    let mut generator = QrGenerator::new(options_in(&dir), None).unwrap();

    for text in ["", "A", "Hi", "1234567"] {
        let plain = generator.generate(text).await.unwrap();
        assert_eq!(decode_file(&plain.path).as_deref(), Some(text), "plain {text:?}");
    }

    generator.set_logo_by_path(&logo).unwrap();
    for text in ["", "A", "Hi", "1234567"] {
        let generated = generator.generate(text).await.unwrap();
        assert!(generated.badge_applied);
        let side = image::image_dimensions(&generated.path).unwrap().0;
        assert_eq!(side, (21 + 8) * 10, "{text:?} should fit version 1");
        assert_eq!(
            decode_file(&generated.path).as_deref(),
            Some(text),
            "with logo {text:?}"
        );
    }
}

#[test]
fn logo_errors_surface_to_caller() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = QrGenerator::new(options_in(&dir), None).unwrap();

    let err = generator
        .set_logo_by_path(dir.path().join("nope.png"))
        .unwrap_err();
    assert!(matches!(err, Error::MissingFile(_)));

    let bogus = dir.path().join("bogus.png");
    std::fs::write(&bogus, b"not an image").unwrap();
    let err = generator.set_logo_by_path(&bogus).unwrap_err();
    assert!(matches!(err, Error::InvalidImage { .. }));
}

#[tokio::test]
async fn every_generation_records_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("meta.db");
    let store = SqliteMetadataStore::open(&db, "qr_metadata").await.unwrap();
    let pool = store.pool().clone();

    let generator = QrGenerator::new(options_in(&dir), Some(Box::new(store))).unwrap();
    let first = generator.generate("https://example.com/a").await.unwrap();
    let second = generator.generate("https://example.com/b").await.unwrap();

    assert_ne!(first.id, second.id);
    assert_ne!(first.path, second.path);

    let rows: Vec<(String, String, String, String)> =
        sqlx::query_as("SELECT id, url, author, description FROM qr_metadata ORDER BY url")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].0, first.id.to_string());
    assert_eq!(rows[0].1, "https://example.com/a");
    assert_eq!(rows[1].0, second.id.to_string());
    assert_eq!(rows[1].1, "https://example.com/b");
    assert_eq!(rows[0].2, "<default>");
    assert_eq!(rows[0].3, "<default>");
}

#[tokio::test]
async fn unreadable_mask_falls_back_to_solid_fill() {
    let dir = tempfile::tempdir().unwrap();
    let mask = dir.path().join("mask.png");
    std::fs::write(&mask, b"garbage").unwrap();

    let options = GeneratorOptions {
        style: StyleOptions {
            fill: FillMode::ImageMask,
            mask_image: Some(mask),
            ..StyleOptions::default()
        },
        ..options_in(&dir)
    };
    let generator = QrGenerator::new(options, None).unwrap();

    let generated = generator.generate("fallback").await.unwrap();
    assert_eq!(decode_file(&generated.path).as_deref(), Some("fallback"));
}

#[tokio::test]
async fn rounded_gradient_code_verifies() {
    let dir = tempfile::tempdir().unwrap();
    let options = GeneratorOptions {
        verify: true,
        style: StyleOptions {
            shape: ModuleShape::Rounded,
            fill: FillMode::RadialGradient,
            color: "black".parse().unwrap(),
            gradient_color: Some("#000080".parse().unwrap()),
            ..StyleOptions::default()
        },
        ..options_in(&dir)
    };
    let generator = QrGenerator::new(options, None).unwrap();

    let generated = generator.generate("https://example.com").await.unwrap();
    assert_eq!(generated.verified, Some(true));
}
