//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what to draw and encode) and the [`backend`](super::backend)
//! (which does the codec and resampling work). They are also the whole
//! configuration surface a caller has: the [`config`](crate::config) recipe
//! file is just a serialization of these types.
//!
//! ## Types
//!
//! - [`FilterParams`]: Brightness / contrast / saturation / gamma / blur. Defaults are the identity.
//! - [`Quality`]: Normalized lossy encoding quality in (0, 1], default 0.9. Clamped on construction.
//! - [`TargetFormat`]: Export format and its background compositing rule.
//! - [`SizeSpec`]: Resize target box plus the aspect-preservation flag.
//! - [`CropRect`]: Source-space rectangle for cropping.
//! - [`EncodedFormat`]: What a byte stream actually is (may differ from the request after a fallback).
//! - [`EncodeParams`]: Everything one backend encode needs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named adjustment values.
///
/// | Field | Range | Identity |
/// |---|---|---|
/// | `brightness` | -100..=100 | 0 |
/// | `contrast` | -100..=100 | 0 |
/// | `saturation` | -100..=100 | 0 |
/// | `gamma` | 0.1..=3.0 | 1.0 |
/// | `blur` | 0..=10 | 0 (preview only) |
///
/// Ranges are not enforced here; the filter engine clamps pixel outputs, not
/// inputs. [`ExportRecipe::validate`](crate::config::ExportRecipe::validate)
/// checks them at the configuration boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterParams {
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub gamma: f64,
    /// Blur radius in pixels. Only the preview renderer honours it.
    pub blur: f64,
}

impl FilterParams {
    pub const BRIGHTNESS_RANGE: (f64, f64) = (-100.0, 100.0);
    pub const CONTRAST_RANGE: (f64, f64) = (-100.0, 100.0);
    pub const SATURATION_RANGE: (f64, f64) = (-100.0, 100.0);
    pub const GAMMA_RANGE: (f64, f64) = (0.1, 3.0);
    pub const BLUR_RANGE: (f64, f64) = (0.0, 10.0);

    /// True when every exact-mode adjustment is at its identity value.
    ///
    /// Blur is not considered: exact mode ignores it.
    pub fn is_exact_identity(&self) -> bool {
        self.brightness == 0.0
            && self.contrast == 0.0
            && self.saturation == 0.0
            && self.gamma == 1.0
    }
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 0.0,
            saturation: 0.0,
            gamma: 1.0,
            blur: 0.0,
        }
    }
}

/// Normalized quality for lossy encoding, in (0, 1].
///
/// UI sliders usually run 0–100; use [`Quality::from_percent`] for those.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Quality(f32);

impl Quality {
    /// Smallest quality we hand to a codec.
    pub const MIN: f32 = 0.01;

    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(Self::MIN, 1.0))
    }

    pub fn from_percent(percent: u32) -> Self {
        Self::new(percent as f32 / 100.0)
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Quality on the 1–100 scale codecs expect.
    pub fn codec_value(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.9)
    }
}

impl From<f32> for Quality {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for f32 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// How the drawing surface is prepared before the raster is drawn onto it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    /// Raster is written as-is, straight alpha preserved.
    None,
    /// Surface cleared to fully transparent, then the raster drawn over it.
    Transparent,
    /// Surface filled with opaque white, then the raster drawn over it.
    OpaqueWhite,
}

/// Export format requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetFormat {
    #[default]
    Png,
    PngTransparent,
    Jpeg,
    #[serde(rename = "webp")]
    WebP,
    /// Multi-resolution icon. Produced by the favicon bundler, not by a
    /// single encode.
    Ico,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 5] = [
        TargetFormat::Png,
        TargetFormat::PngTransparent,
        TargetFormat::Jpeg,
        TargetFormat::WebP,
        TargetFormat::Ico,
    ];

    /// Identifier used by callers and in recipe files.
    pub fn id(self) -> &'static str {
        match self {
            TargetFormat::Png => "png",
            TargetFormat::PngTransparent => "png-transparent",
            TargetFormat::Jpeg => "jpeg",
            TargetFormat::WebP => "webp",
            TargetFormat::Ico => "ico",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.id().eq_ignore_ascii_case(id))
    }

    pub fn background(self) -> Background {
        match self {
            TargetFormat::PngTransparent => Background::Transparent,
            TargetFormat::Jpeg => Background::OpaqueWhite,
            TargetFormat::Png | TargetFormat::WebP | TargetFormat::Ico => Background::None,
        }
    }

    /// Whether a [`Quality`] influences the encoded output.
    pub fn uses_quality(self) -> bool {
        matches!(self, TargetFormat::Jpeg | TargetFormat::WebP)
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Resize target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizeSpec {
    pub width: u32,
    pub height: u32,
    /// Scale uniformly to fit inside the box instead of filling it exactly.
    #[serde(default = "default_preserve_aspect")]
    pub preserve_aspect: bool,
}

fn default_preserve_aspect() -> bool {
    true
}

impl SizeSpec {
    pub fn new(width: u32, height: u32, preserve_aspect: bool) -> Self {
        Self {
            width,
            height,
            preserve_aspect,
        }
    }
}

/// Crop rectangle in source pixel coordinates.
///
/// May extend past the source; uncovered output pixels are transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Concrete encoding of an exported byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodedFormat {
    Png,
    Jpeg,
    #[serde(rename = "webp")]
    WebP,
    Ico,
}

impl EncodedFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            EncodedFormat::Png => "image/png",
            EncodedFormat::Jpeg => "image/jpeg",
            EncodedFormat::WebP => "image/webp",
            EncodedFormat::Ico => "image/x-icon",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            EncodedFormat::Png => "png",
            EncodedFormat::Jpeg => "jpg",
            EncodedFormat::WebP => "webp",
            EncodedFormat::Ico => "ico",
        }
    }
}

impl fmt::Display for EncodedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Parameters for a single backend encode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeParams {
    pub format: EncodedFormat,
    /// Ignored by lossless formats.
    pub quality: Quality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_defaults_are_identity() {
        let params = FilterParams::default();
        assert!(params.is_exact_identity());
        assert_eq!(params.blur, 0.0);
    }

    #[test]
    fn blur_alone_is_still_exact_identity() {
        let params = FilterParams {
            blur: 4.0,
            ..FilterParams::default()
        };
        assert!(params.is_exact_identity());
    }

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0.0).value(), Quality::MIN);
        assert_eq!(Quality::new(0.5).value(), 0.5);
        assert_eq!(Quality::new(3.0).value(), 1.0);
        assert_eq!(Quality::new(f32::NAN), Quality::default());
    }

    #[test]
    fn quality_is_clamped_when_deserialized() {
        let q: Quality = serde_json::from_str("5.0").unwrap();
        assert_eq!(q.value(), 1.0);
        let q: Quality = serde_json::from_str("-1.0").unwrap();
        assert_eq!(q.value(), Quality::MIN);
        let q: Quality = serde_json::from_str("0.5").unwrap();
        assert_eq!(serde_json::to_string(&q).unwrap(), "0.5");
    }

    #[test]
    fn quality_codec_scale() {
        assert_eq!(Quality::default().codec_value(), 90);
        assert_eq!(Quality::from_percent(75).codec_value(), 75);
        assert_eq!(Quality::new(0.0).codec_value(), 1);
        assert_eq!(Quality::new(1.0).codec_value(), 100);
    }

    #[test]
    fn format_ids_round_trip() {
        for format in TargetFormat::ALL {
            assert_eq!(TargetFormat::from_id(format.id()), Some(format));
        }
        assert_eq!(TargetFormat::from_id("PNG"), Some(TargetFormat::Png));
        assert_eq!(TargetFormat::from_id("svg"), None);
    }

    #[test]
    fn format_background_rules() {
        assert_eq!(TargetFormat::Png.background(), Background::None);
        assert_eq!(
            TargetFormat::PngTransparent.background(),
            Background::Transparent
        );
        assert_eq!(TargetFormat::Jpeg.background(), Background::OpaqueWhite);
        assert_eq!(TargetFormat::WebP.background(), Background::None);
    }

    #[test]
    fn only_lossy_formats_use_quality() {
        let lossy: Vec<_> = TargetFormat::ALL
            .into_iter()
            .filter(|f| f.uses_quality())
            .collect();
        assert_eq!(lossy, vec![TargetFormat::Jpeg, TargetFormat::WebP]);
    }

    #[test]
    fn encoded_format_mime_and_extension() {
        assert_eq!(EncodedFormat::Png.mime_type(), "image/png");
        assert_eq!(EncodedFormat::Jpeg.extension(), "jpg");
        assert_eq!(EncodedFormat::WebP.to_string(), "image/webp");
    }

    #[test]
    fn size_spec_preserves_aspect_by_default() {
        let spec: SizeSpec = serde_json::from_str(r#"{"width": 10, "height": 20}"#).unwrap();
        assert!(spec.preserve_aspect);
    }
}
