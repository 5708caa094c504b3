//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_dimensions` (header only) |
//! | Decode (PNG, JPEG, WebP, ICO) | `image` crate (pure Rust decoders) |
//! | Resize | `image::imageops::resize` with `Lanczos3` filter |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality 1–100, alpha dropped) |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless container; quality < 1 quantizes RGB first) |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{EncodeParams, EncodedFormat, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Open an in-memory reader, sniffing the format from the bytes first and
/// falling back to `hint`.
fn reader(
    bytes: &[u8],
    hint: Option<ImageFormat>,
) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    let mut reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    if reader.format().is_none() {
        match hint {
            Some(format) => reader.set_format(format),
            None => {
                return Err(BackendError::DecodeFailed(
                    "Unrecognized image format".to_string(),
                ));
            }
        }
    }
    Ok(reader)
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, BackendError> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| BackendError::ProcessingFailed(format!("PNG encode failed: {e}")))?;
    Ok(out)
}

/// JPEG has no alpha channel; callers flatten onto a background first.
fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<Vec<u8>, BackendError> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {e}")))?;
    Ok(out)
}

/// The `image` WebP encoder is lossless only. Below full quality the RGB
/// channels are quantized first, trading colour detail for size; alpha is
/// left alone. Full quality stays lossless.
fn encode_webp(image: &RgbaImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let mut out = Vec::new();
    let encoder = WebPEncoder::new_lossless(&mut out);
    let (width, height) = image.dimensions();
    let result = match webp_levels(quality) {
        Some(levels) => {
            let mut quantized = image.clone();
            quantize_rgb(&mut quantized, levels);
            encoder.write_image(quantized.as_raw(), width, height, ExtendedColorType::Rgba8)
        }
        None => encoder.write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8),
    };
    result.map_err(|e| BackendError::ProcessingFailed(format!("WebP encode failed: {e}")))?;
    Ok(out)
}

/// Palette size per channel for a WebP quality, or `None` at full quality.
///
/// Quadratic so high qualities keep most of the detail while low ones get
/// coarse quickly: 0.5 gives 66 levels, 0.1 gives 5.
fn webp_levels(quality: Quality) -> Option<u16> {
    let q = quality.codec_value();
    if q >= 100 {
        return None;
    }
    let normalized = q as f32 / 100.0;
    let levels = 2.0 + normalized * normalized * 254.0;
    Some(levels.round().clamp(2.0, 256.0) as u16)
}

fn quantize_rgb(image: &mut RgbaImage, levels: u16) {
    let step = 255.0 / (levels as f32 - 1.0);
    for pixel in image.pixels_mut() {
        for channel in pixel.0.iter_mut().take(3) {
            let bucket = (*channel as f32 / step).round();
            *channel = (bucket * step).round().clamp(0.0, 255.0) as u8;
        }
    }
}

impl ImageBackend for RustBackend {
    fn identify(
        &self,
        bytes: &[u8],
        hint: Option<ImageFormat>,
    ) -> Result<Dimensions, BackendError> {
        let (width, height) = reader(bytes, hint)?.into_dimensions().map_err(|e| {
            BackendError::DecodeFailed(format!("Failed to read dimensions: {e}"))
        })?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, bytes: &[u8], hint: Option<ImageFormat>) -> Result<RgbaImage, BackendError> {
        reader(bytes, hint)?
            .decode()
            .map(|img| img.to_rgba8())
            .map_err(|e| BackendError::DecodeFailed(e.to_string()))
    }

    fn resize(
        &self,
        image: &RgbaImage,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::ProcessingFailed(format!(
                "Cannot resize to {width}x{height}"
            )));
        }
        Ok(image::imageops::resize(
            image,
            width,
            height,
            FilterType::Lanczos3,
        ))
    }

    fn encode(&self, image: &RgbaImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
        match params.format {
            EncodedFormat::Png => encode_png(image),
            EncodedFormat::Jpeg => encode_jpeg(image, params.quality.codec_value()),
            EncodedFormat::WebP => encode_webp(image, params.quality),
            EncodedFormat::Ico => Err(BackendError::Unavailable(EncodedFormat::Ico)),
        }
    }
}
