//! Pixel filter engine: exact per-pixel adjustments and the cheap preview.
//!
//! | Mode | Entry point | Used for | Blur |
//! |---|---|---|---|
//! | Exact | [`apply_exact`] | final export | ignored |
//! | Preview | [`PreviewFilter::render`] | live feedback | yes |
//!
//! Exact mode runs, per color channel and in this order, brightness,
//! contrast and gamma, each clamped to 0–255, followed by a whole-pixel
//! saturation pass through HSL. Steps 1–3 depend only on the input channel
//! value, so they are baked into a 256-entry lookup table once per call.
//!
//! Preview mode approximates the same adjustments with multiplicative
//! percentages (the CSS `filter` model) and is the only mode with blur.
//! The two modes do not agree pixel-for-pixel.

use super::color_space::{hsl_to_rgb, rgb_to_hsl};
use super::params::FilterParams;
use super::raster::Raster;
use image::imageops;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Apply brightness, contrast, gamma and saturation exactly.
///
/// Alpha is never touched. Identity parameters return the raster unchanged;
/// `params.blur` has no exact-mode equivalent and is ignored.
pub fn apply_exact(mut raster: Raster, params: &FilterParams) -> Raster {
    if params.is_exact_identity() {
        return raster;
    }

    let lut = channel_lut(params);
    let saturation = params.saturation;

    for px in raster.as_raw_mut().chunks_exact_mut(4) {
        px[0] = lut[px[0] as usize];
        px[1] = lut[px[1] as usize];
        px[2] = lut[px[2] as usize];
    }

    if saturation != 0.0 {
        for px in raster.as_raw_mut().chunks_exact_mut(4) {
            let (h, s, l) = rgb_to_hsl(px[0], px[1], px[2]);
            let (r, g, b) = hsl_to_rgb(h, adjust_saturation(s, saturation), l);
            px[0] = r;
            px[1] = g;
            px[2] = b;
        }
    }

    raster
}

/// Brightness, contrast and gamma for a single channel value.
pub fn adjust_channel(c: u8, params: &FilterParams) -> u8 {
    let mut v = c as f64;
    v = clamp_channel(v + params.brightness / 100.0 * 255.0);
    v = clamp_channel((v - 128.0) * (params.contrast + 100.0) / 100.0 + 128.0);
    if params.gamma != 1.0 {
        v = 255.0 * (v / 255.0).powf(1.0 / params.gamma);
    }
    // Stored like a clamped 8-bit canvas buffer: ties round to even.
    clamp_channel(v.round_ties_even()) as u8
}

/// Shift an HSL saturation by `amount` percent, staying inside `[0, 1]`.
pub fn adjust_saturation(s: f64, amount: f64) -> f64 {
    (s + amount / 100.0).clamp(0.0, 1.0)
}

fn channel_lut(params: &FilterParams) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (c, out) in lut.iter_mut().enumerate() {
        *out = adjust_channel(c as u8, params);
    }
    lut
}

#[inline]
fn clamp_channel(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 255.0) }
}

/// Approximate filter descriptor for interactive preview.
///
/// Brightness, contrast and saturation are percentages where 100 is the
/// identity; blur is a Gaussian radius in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewFilter {
    pub brightness: f64,
    pub contrast: f64,
    pub saturate: f64,
    pub blur: f64,
}

impl PreviewFilter {
    pub fn from_params(params: &FilterParams) -> Self {
        Self {
            brightness: 100.0 + params.brightness,
            contrast: 100.0 + params.contrast,
            saturate: 100.0 + params.saturation,
            blur: params.blur.max(0.0),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.brightness == 100.0
            && self.contrast == 100.0
            && self.saturate == 100.0
            && self.blur == 0.0
    }

    /// CSS `filter` value, e.g. `brightness(120%) blur(2px)`, or `none`.
    ///
    /// Identity components are omitted.
    pub fn to_css(&self) -> String {
        let mut parts = Vec::new();
        if self.brightness != 100.0 {
            parts.push(format!("brightness({}%)", self.brightness));
        }
        if self.contrast != 100.0 {
            parts.push(format!("contrast({}%)", self.contrast));
        }
        if self.saturate != 100.0 {
            parts.push(format!("saturate({}%)", self.saturate));
        }
        if self.blur > 0.0 {
            parts.push(format!("blur({}px)", self.blur));
        }
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(" ")
        }
    }

    /// Render the descriptor onto a copy of `raster` in one pass.
    ///
    /// The input is left untouched.
    pub fn render(&self, raster: &Raster) -> Raster {
        if self.is_identity() {
            return raster.clone();
        }

        let brightness = (self.brightness / 100.0).max(0.0) as f32;
        let contrast = (self.contrast / 100.0).max(0.0) as f32;
        let saturate = (self.saturate / 100.0).max(0.0) as f32;

        let mut image = raster.as_image().clone();
        for px in image.pixels_mut() {
            let mut rgb = [
                px.0[0] as f32 / 255.0,
                px.0[1] as f32 / 255.0,
                px.0[2] as f32 / 255.0,
            ];
            if brightness != 1.0 {
                rgb = rgb.map(|c| (c * brightness).clamp(0.0, 1.0));
            }
            if contrast != 1.0 {
                rgb = rgb.map(|c| ((c - 0.5) * contrast + 0.5).clamp(0.0, 1.0));
            }
            if saturate != 1.0 {
                rgb = saturate_matrix(rgb, saturate);
            }
            for (dst, c) in px.0.iter_mut().zip(rgb) {
                *dst = (c * 255.0).round() as u8;
            }
        }

        if self.blur > 0.0 {
            image = imageops::blur(&image, self.blur as f32);
        }

        // Dimensions come straight from a valid raster.
        Raster::from_image(image).unwrap_or_else(|_| raster.clone())
    }
}

impl Default for PreviewFilter {
    fn default() -> Self {
        Self::from_params(&FilterParams::default())
    }
}

impl fmt::Display for PreviewFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// `feColorMatrix type="saturate"` on normalized RGB.
fn saturate_matrix([r, g, b]: [f32; 3], s: f32) -> [f32; 3] {
    [
        (0.213 + 0.787 * s) * r + (0.715 - 0.715 * s) * g + (0.072 - 0.072 * s) * b,
        (0.213 - 0.213 * s) * r + (0.715 + 0.285 * s) * g + (0.072 - 0.072 * s) * b,
        (0.213 - 0.213 * s) * r + (0.715 - 0.715 * s) * g + (0.072 + 0.928 * s) * b,
    ]
    .map(|c| c.clamp(0.0, 1.0))
}
