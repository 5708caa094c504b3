//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take parameters, compute dimensions and compositing, and call the
//! backend. Each one consumes or borrows a [`Raster`] and returns a new value;
//! nothing here keeps a raster between calls.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{calculate_crop_overlap, calculate_resize_dimensions};
use super::encoded::Encoded;
use super::params::{
    Background, CropRect, EncodeParams, EncodedFormat, Quality, SizeSpec, TargetFormat,
};
use super::raster::{Raster, Surface};
use image::{ImageFormat, RgbaImage, imageops};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source bytes are malformed or in an unsupported format.
    #[error("Failed to decode image: {0}")]
    Decode(String),
    /// Non-positive target size, or a pixel buffer that does not match its
    /// declared dimensions.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },
    #[error("Failed to encode image: {0}")]
    Encode(String),
    #[error("ICO output is produced by the favicon bundle, not by a single encode")]
    IcoRequiresBundle,
    /// One favicon size failed; no partial bundle is returned.
    #[error("Favicon bundle failed at {size}x{size}: {source}")]
    BundlePartialFailure {
        size: u32,
        #[source]
        source: Box<PipelineError>,
    },
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Format hint from a declared content type such as `image/png`.
///
/// Only consulted when the bytes themselves carry no signature.
pub fn format_hint(mime_type: Option<&str>) -> Option<ImageFormat> {
    mime_type.and_then(ImageFormat::from_mime_type)
}

/// Read dimensions without a full decode.
pub fn identify(
    backend: &impl ImageBackend,
    bytes: &[u8],
    mime_type: Option<&str>,
) -> Result<Dimensions> {
    backend
        .identify(bytes, format_hint(mime_type))
        .map_err(|e| PipelineError::Decode(e.to_string()))
}

/// Decode raw bytes into a raster.
pub fn decode(
    backend: &impl ImageBackend,
    bytes: &[u8],
    mime_type: Option<&str>,
) -> Result<Raster> {
    if bytes.is_empty() {
        return Err(PipelineError::Decode("empty input".to_string()));
    }
    let image = backend
        .decode(bytes, format_hint(mime_type))
        .map_err(|e| PipelineError::Decode(e.to_string()))?;
    debug!(
        width = image.width(),
        height = image.height(),
        bytes = bytes.len(),
        "decoded source image"
    );
    Raster::from_image(image).map_err(|e| PipelineError::Decode(e.to_string()))
}

/// Resize to fit (or fill) the target box.
///
/// See [`calculate_resize_dimensions`] for the aspect rule. Resampling uses
/// the backend's high-quality filter. A zero-sized target fails with
/// [`PipelineError::InvalidDimension`].
pub fn resize(backend: &impl ImageBackend, raster: Raster, target: SizeSpec) -> Result<Raster> {
    if target.width == 0 || target.height == 0 {
        return Err(PipelineError::InvalidDimension {
            width: target.width,
            height: target.height,
        });
    }

    let (width, height) = calculate_resize_dimensions(raster.dimensions(), target);
    if (width, height) == raster.dimensions() {
        return Ok(raster);
    }

    debug!(
        from_width = raster.width(),
        from_height = raster.height(),
        width,
        height,
        preserve_aspect = target.preserve_aspect,
        "resizing"
    );
    let resized = backend.resize(raster.as_image(), width, height)?;
    Raster::from_image(resized)
}

/// Cut `rect` out of the raster.
///
/// The part of `rect` outside the source comes out fully transparent.
pub fn crop(raster: &Raster, rect: CropRect) -> Result<Raster> {
    if rect.width == 0 || rect.height == 0 {
        return Err(PipelineError::InvalidDimension {
            width: rect.width,
            height: rect.height,
        });
    }

    let mut out = RgbaImage::new(rect.width, rect.height);
    let overlap = calculate_crop_overlap(raster.dimensions(), rect);
    if overlap.width > 0 && overlap.height > 0 {
        let region = imageops::crop_imm(
            raster.as_image(),
            overlap.src_x,
            overlap.src_y,
            overlap.width,
            overlap.height,
        )
        .to_image();
        imageops::replace(&mut out, &region, 0, 0);
    }
    Raster::from_image(out)
}

/// Encode a raster into `format`.
///
/// The format's [`Background`] rule is applied on `surface` first. For WebP
/// the produced bytes are checked; if they are not actually WebP (or the
/// encoder is missing) the raster is encoded as PNG instead and the result
/// says so in [`Encoded::format`]. `quality` only affects JPEG and WebP.
pub fn encode(
    backend: &impl ImageBackend,
    surface: &mut Surface,
    raster: Raster,
    format: TargetFormat,
    quality: Quality,
) -> Result<Encoded> {
    if format == TargetFormat::Ico {
        return Err(PipelineError::IcoRequiresBundle);
    }

    let prepared = match format.background() {
        Background::None => raster,
        Background::Transparent => composite(surface, &raster, [0, 0, 0, 0])?,
        Background::OpaqueWhite => composite(surface, &raster, [255, 255, 255, 255])?,
    };

    let encoded = match format {
        TargetFormat::Jpeg => encode_as(backend, &prepared, EncodedFormat::Jpeg, quality)?,
        TargetFormat::WebP => encode_webp_or_png(backend, &prepared, quality)?,
        _ => encode_as(backend, &prepared, EncodedFormat::Png, quality)?,
    };

    debug!(
        requested = %format,
        produced = %encoded.format,
        bytes = encoded.len(),
        "encoded"
    );
    Ok(encoded)
}

/// Prepare the surface with `fill`, draw the raster over it, and read it back.
fn composite(surface: &mut Surface, raster: &Raster, fill: [u8; 4]) -> Result<Raster> {
    surface.prepare(raster.width(), raster.height(), fill);
    surface.draw(raster);
    surface.snapshot()
}

fn encode_as(
    backend: &impl ImageBackend,
    raster: &Raster,
    format: EncodedFormat,
    quality: Quality,
) -> Result<Encoded> {
    let bytes = backend
        .encode(raster.as_image(), &EncodeParams { format, quality })
        .map_err(|e| PipelineError::Encode(e.to_string()))?;
    Ok(Encoded::new(bytes, format))
}

fn encode_webp_or_png(
    backend: &impl ImageBackend,
    raster: &Raster,
    quality: Quality,
) -> Result<Encoded> {
    let params = EncodeParams {
        format: EncodedFormat::WebP,
        quality,
    };
    match backend.encode(raster.as_image(), &params) {
        Ok(bytes) if is_webp(&bytes) => return Ok(Encoded::new(bytes, EncodedFormat::WebP)),
        Ok(bytes) => warn!(
            produced = ?image::guess_format(&bytes).ok(),
            "WebP encoder returned another format, falling back to PNG"
        ),
        Err(e) => warn!(error = %e, "WebP encoding unavailable, falling back to PNG"),
    }
    encode_as(backend, raster, EncodedFormat::Png, quality)
}

/// Whether `bytes` start with a RIFF/WEBP container header.
fn is_webp(bytes: &[u8]) -> bool {
    matches!(image::guess_format(bytes), Ok(ImageFormat::WebP))
}
