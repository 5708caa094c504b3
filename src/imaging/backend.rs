//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four codec and resampling
//! operations the pipeline needs: identify, decode, resize, and encode.
//! Everything else (filters, compositing, aspect math, fallback policy)
//! lives above the trait and is backend-agnostic.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::{EncodeParams, EncodedFormat};
use image::{ImageFormat, RgbaImage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    DecodeFailed(String),
    /// The runtime has no encoder for this format.
    #[error("No {0} encoder available")]
    Unavailable(EncodedFormat),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// Implementations must be `Sync`: one backend is shared by every pipeline,
/// while the per-call drawing state lives in a
/// [`Surface`](super::raster::Surface).
pub trait ImageBackend: Sync {
    /// Read the pixel dimensions without decoding the full image.
    fn identify(&self, bytes: &[u8], hint: Option<ImageFormat>) -> Result<Dimensions, BackendError>;

    /// Decode to straight-alpha RGBA8. `hint` is used when the bytes carry
    /// no recognizable signature.
    fn decode(&self, bytes: &[u8], hint: Option<ImageFormat>) -> Result<RgbaImage, BackendError>;

    /// Resample to exactly `width × height`.
    fn resize(&self, image: &RgbaImage, width: u32, height: u32)
    -> Result<RgbaImage, BackendError>;

    /// Encode an already-composited image.
    fn encode(&self, image: &RgbaImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError>;
}
