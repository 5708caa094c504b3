//! End-to-end tests against the real `image`-crate backend.
//!
//! Sources are generated in memory; nothing is read from fixtures.

use image::{ImageFormat, Rgba, RgbaImage};
use pixelprep::config::{ExportRecipe, load_recipe};
use pixelprep::imaging::{
    EncodedFormat, FilterParams, Quality, SharedSurface, SizeSpec, Surface, TargetFormat,
};
use pixelprep::metadata::SourceImage;
use pixelprep::pipeline::Pipeline;
use std::sync::Arc;
use std::thread;

fn png_source(image: &RgbaImage, name: &str) -> SourceImage {
    let mut bytes = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    SourceImage::new(bytes, Some("image/png"), name)
}

fn solid(width: u32, height: u32, color: [u8; 4]) -> SourceImage {
    png_source(&RgbaImage::from_pixel(width, height, Rgba(color)), "solid.png")
}

fn export(source: &SourceImage, recipe: &ExportRecipe) -> pixelprep::imaging::Encoded {
    Pipeline::new()
        .export(source, recipe, &mut Surface::new())
        .unwrap()
}

#[test]
fn transparent_pixels_become_white_in_jpeg() {
    let source = solid(8, 8, [0, 0, 0, 0]);
    let out = export(
        &source,
        &ExportRecipe {
            format: TargetFormat::Jpeg,
            quality: Quality::new(1.0),
            ..ExportRecipe::default()
        },
    );
    assert_eq!(out.mime_type(), "image/jpeg");

    let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgb8();
    for pixel in decoded.pixels() {
        assert!(pixel.0.iter().all(|&c| c >= 250), "got {:?}", pixel.0);
    }
}

#[test]
fn transparent_pixels_stay_transparent_in_png_transparent() {
    let source = solid(8, 8, [0, 0, 0, 0]);
    let out = export(
        &source,
        &ExportRecipe {
            format: TargetFormat::PngTransparent,
            ..ExportRecipe::default()
        },
    );
    assert_eq!(out.format, EncodedFormat::Png);

    let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
    assert!(decoded.pixels().all(|p| p.0[3] == 0));
}

#[test]
fn identity_png_export_is_lossless() {
    let original = RgbaImage::from_fn(9, 5, |x, y| Rgba([x as u8 * 20, y as u8 * 40, 7, 128]));
    let out = export(&png_source(&original, "g.png"), &ExportRecipe::default());
    let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
    assert_eq!(decoded, original);
}

#[test]
fn resize_preserving_aspect_and_not() {
    let source = solid(400, 200, [50, 100, 150, 255]);

    let fitted = export(
        &source,
        &ExportRecipe {
            resize: Some(SizeSpec::new(100, 100, true)),
            ..ExportRecipe::default()
        },
    );
    let img = image::load_from_memory(&fitted.bytes).unwrap();
    assert_eq!((img.width(), img.height()), (100, 50));

    let stretched = export(
        &source,
        &ExportRecipe {
            resize: Some(SizeSpec::new(100, 100, false)),
            ..ExportRecipe::default()
        },
    );
    let img = image::load_from_memory(&stretched.bytes).unwrap();
    assert_eq!((img.width(), img.height()), (100, 100));
}

#[test]
fn webp_export_is_webp() {
    let out = export(
        &solid(10, 10, [200, 10, 10, 255]),
        &ExportRecipe {
            format: TargetFormat::WebP,
            ..ExportRecipe::default()
        },
    );
    assert_eq!(out.format, EncodedFormat::WebP);
    assert_eq!(image::guess_format(&out.bytes).unwrap(), ImageFormat::WebP);
    assert_eq!(out.file_name("photo"), "photo.webp");
}

#[test]
fn webp_quality_trades_detail_for_size() {
    let gradient = RgbaImage::from_fn(64, 64, |x, y| {
        Rgba([(x * 4) as u8, (y * 4) as u8, ((x ^ y) * 4) as u8, 255])
    });
    let source = png_source(&gradient, "gradient.png");
    let webp = |quality: f32| {
        export(
            &source,
            &ExportRecipe {
                format: TargetFormat::WebP,
                quality: Quality::new(quality),
                ..ExportRecipe::default()
            },
        )
    };

    let low = webp(0.1);
    let full = webp(1.0);
    assert_eq!(low.format, EncodedFormat::WebP);
    assert!(low.len() < full.len(), "low {} full {}", low.len(), full.len());

    let decoded = image::load_from_memory(&full.bytes).unwrap().to_rgba8();
    assert_eq!(decoded, gradient);
    let decoded = image::load_from_memory(&low.bytes).unwrap().to_rgba8();
    assert_ne!(decoded, gradient);
}

#[test]
fn favicon_bundle_decodes_at_each_size() {
    let pipeline = Pipeline::new();
    let set = pipeline
        .favicons(&solid(120, 80, [0, 128, 255, 255]), &FilterParams::default())
        .unwrap();

    assert_eq!(set.labels().collect::<Vec<_>>(), ["16x16", "32x32", "48x48"]);
    for (size, icon) in set.iter() {
        let img = image::load_from_memory_with_format(&icon.bytes, ImageFormat::Png).unwrap();
        assert_eq!((img.width(), img.height()), (size, size));
    }
}

#[test]
fn greyscale_recipe_from_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("grey.toml");
    std::fs::write(
        &path,
        r#"
format = "png"

[filters]
saturation = -100.0

[resize]
width = 4
height = 4
"#,
    )
    .unwrap();
    let recipe = load_recipe(&path).unwrap();

    let out = export(&solid(16, 16, [255, 0, 0, 255]), &recipe);
    let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (4, 4));
    let [r, g, b, a] = decoded.get_pixel(2, 2).0;
    assert_eq!(r, g);
    assert_eq!(g, b);
    assert_eq!(a, 255);
}

#[test]
fn metadata_from_disk() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("wide.png");
    std::fs::write(&path, solid(30, 10, [0, 0, 0, 255]).bytes).unwrap();

    let source = SourceImage::from_path(&path).unwrap();
    let meta = Pipeline::new().metadata(&source).unwrap();
    assert_eq!((meta.width, meta.height), (30, 10));
    assert_eq!(meta.mime_type, "image/png");
    assert_eq!(meta.name, "wide.png");
    assert_eq!(meta.byte_size, source.bytes.len() as u64);
}

#[test]
fn concurrent_exports_share_one_surface() {
    let pipeline = Arc::new(Pipeline::new());
    let surface = Arc::new(SharedSurface::new());
    let recipe = ExportRecipe {
        format: TargetFormat::Jpeg,
        ..ExportRecipe::default()
    };

    let handles: Vec<_> = (0..4u32)
        .map(|i| {
            let pipeline = Arc::clone(&pipeline);
            let surface = Arc::clone(&surface);
            let recipe = recipe.clone();
            thread::spawn(move || {
                let side = 8 + i * 4;
                let source = solid(side, side, [0, 0, 0, 0]);
                let out = pipeline.export_shared(&source, &recipe, &surface).unwrap();
                let img = image::load_from_memory(&out.bytes).unwrap();
                assert_eq!((img.width(), img.height()), (side, side));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
