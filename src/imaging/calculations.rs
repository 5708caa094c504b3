//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::{CropRect, SizeSpec};

/// Calculate output dimensions for a resize.
///
/// With `preserve_aspect`, the source is scaled by
/// `min(target_w / src_w, target_h / src_h)` on both axes, so the result fits
/// inside the target box and may be smaller than it on one axis. Without it,
/// the target box is returned as-is.
///
/// Each output axis is at least 1 pixel.
///
/// # Examples
/// ```
/// # use pixelprep::imaging::{SizeSpec, calculate_resize_dimensions};
/// // 400x200 into a 100x100 box → scale 0.25 → 100x50
/// assert_eq!(
///     calculate_resize_dimensions((400, 200), SizeSpec::new(100, 100, true)),
///     (100, 50)
/// );
/// assert_eq!(
///     calculate_resize_dimensions((400, 200), SizeSpec::new(100, 100, false)),
///     (100, 100)
/// );
/// ```
pub fn calculate_resize_dimensions(source: (u32, u32), target: SizeSpec) -> (u32, u32) {
    if !target.preserve_aspect {
        return (target.width, target.height);
    }

    let (src_w, src_h) = source;
    let ratio = (target.width as f64 / src_w as f64).min(target.height as f64 / src_h as f64);

    let w = (src_w as f64 * ratio).round().max(1.0) as u32;
    let h = (src_h as f64 * ratio).round().max(1.0) as u32;
    (w, h)
}

/// Overlap between a crop rectangle and the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropOverlap {
    /// Top-left of the overlap in source coordinates.
    pub src_x: u32,
    pub src_y: u32,
    /// Size of the overlap. Zero when the rectangle misses the source.
    pub width: u32,
    pub height: u32,
}

/// Clip a crop rectangle against the source bounds.
///
/// The overlap is copied to the origin of the crop output; the rest of the
/// output stays transparent.
pub fn calculate_crop_overlap(source: (u32, u32), rect: CropRect) -> CropOverlap {
    let (src_w, src_h) = source;
    let right = rect.x.saturating_add(rect.width).min(src_w);
    let bottom = rect.y.saturating_add(rect.height).min(src_h);

    CropOverlap {
        src_x: rect.x,
        src_y: rect.y,
        width: right.saturating_sub(rect.x),
        height: bottom.saturating_sub(rect.y),
    }
}

/// Label used for a square icon of side `size`, e.g. `"32x32"`.
pub fn favicon_label(size: u32) -> String {
    format!("{size}x{size}")
}
