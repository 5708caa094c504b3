//! Image processing on the pure-Rust `image` crate.
//!
//! | Operation | Where |
//! |---|---|
//! | **Decode / identify** | [`operations::decode`], [`operations::identify`] via the backend |
//! | **Exact filters** | [`filters::apply_exact`] (brightness → contrast → gamma → saturation) |
//! | **Preview filters** | [`filters::PreviewFilter`] (CSS-style percentages, blur) |
//! | **Resize / crop** | Lanczos3 through the backend; aspect math in calculations |
//! | **Encode** | PNG / JPEG / WebP with background rules and WebP→PNG fallback |
//! | **Favicons** | 16/32/48 PNG bundle, optional `.ico` packing |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Color space / filters**: Pure pixel math, no backend involved
//! - **Raster**: The pixel buffer and the reusable drawing surface
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod color_space;
mod encoded;
pub mod favicon;
pub mod filters;
pub mod operations;
mod params;
pub mod raster;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    CropOverlap, calculate_crop_overlap, calculate_resize_dimensions, favicon_label,
};
pub use color_space::{hsl_to_rgb, rgb_to_hsl};
pub use encoded::Encoded;
pub use favicon::{FAVICON_SIZES, FaviconSet, generate_favicons};
pub use filters::{PreviewFilter, apply_exact};
pub use operations::{PipelineError, Result, crop, decode, encode, identify, resize};
pub use params::{
    Background, CropRect, EncodeParams, EncodedFormat, FilterParams, Quality, SizeSpec,
    TargetFormat,
};
pub use raster::{Raster, SharedSurface, Surface, SurfaceLease};
pub use rust_backend::RustBackend;
