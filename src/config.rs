//! Export recipe configuration.
//!
//! A recipe is a TOML file that describes one export: which adjustments to
//! apply, an optional crop and resize, and the output format. It is a plain
//! serialization of the [`imaging`](crate::imaging) parameter types, so
//! anything a caller can do programmatically can also be written down.
//!
//! ## Recipe Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! format = "png"          # png | png-transparent | jpeg | webp | ico
//! quality = 0.9           # (0, 1], clamped; JPEG and WebP only
//!
//! [filters]
//! brightness = 0.0        # -100..100
//! contrast = 0.0          # -100..100
//! saturation = 0.0        # -100..100
//! gamma = 1.0             # 0.1..3.0
//! blur = 0.0              # 0..10, preview only
//!
//! [crop]                  # omit to keep the full frame
//! x = 0
//! y = 0
//! width = 512
//! height = 512
//!
//! [resize]                # omit to keep the source size
//! width = 1024
//! height = 1024
//! preserve_aspect = true
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{CropRect, FilterParams, Quality, SizeSpec, TargetFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// One export, as loaded from a recipe file.
///
/// Stages run in a fixed order: crop, exact filters, resize, encode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportRecipe {
    pub format: TargetFormat,
    pub quality: Quality,
    pub filters: FilterParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropRect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resize: Option<SizeSpec>,
}

impl ExportRecipe {
    /// Validate values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.filters;
        check_range("filters.brightness", f.brightness, FilterParams::BRIGHTNESS_RANGE)?;
        check_range("filters.contrast", f.contrast, FilterParams::CONTRAST_RANGE)?;
        check_range("filters.saturation", f.saturation, FilterParams::SATURATION_RANGE)?;
        check_range("filters.gamma", f.gamma, FilterParams::GAMMA_RANGE)?;
        check_range("filters.blur", f.blur, FilterParams::BLUR_RANGE)?;

        if let Some(resize) = self.resize
            && (resize.width == 0 || resize.height == 0)
        {
            return Err(ConfigError::Validation(
                "resize.width and resize.height must be non-zero".into(),
            ));
        }
        if let Some(crop) = self.crop
            && (crop.width == 0 || crop.height == 0)
        {
            return Err(ConfigError::Validation(
                "crop.width and crop.height must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

fn check_range(key: &str, value: f64, (min, max): (f64, f64)) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{key} must be {min}..{max}, got {value}"
        )))
    }
}

/// Parse and validate a recipe from TOML text.
pub fn parse_recipe(content: &str) -> Result<ExportRecipe, ConfigError> {
    let recipe: ExportRecipe = toml::from_str(content)?;
    recipe.validate()?;
    Ok(recipe)
}

/// Load a recipe file from disk.
pub fn load_recipe(path: &Path) -> Result<ExportRecipe, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_recipe(&content)
}

/// Returns a fully-commented stock recipe with all keys and explanations.
pub fn stock_recipe_toml() -> &'static str {
    r##"# Export Recipe
# =============
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Output format:
#   png              - raster written as-is, alpha preserved
#   png-transparent  - drawn over a cleared surface, alpha preserved
#   jpeg             - flattened onto opaque white
#   webp             - falls back to PNG when WebP encoding is unavailable
#   ico              - 16x16, 32x32 and 48x48 icons packed into one .ico
format = "png"

# Lossy quality in (0, 1]; out-of-range values are clamped.
# Only JPEG and WebP use it.
quality = 0.9

# ---------------------------------------------------------------------------
# Adjustments
# ---------------------------------------------------------------------------
[filters]
# Additive shift, -100..100.
brightness = 0.0
# Stretch around mid-grey, -100..100.
contrast = 0.0
# HSL saturation scale, -100..100. -100 is greyscale.
saturation = 0.0
# Power curve, 0.1..3.0. Values above 1 brighten midtones.
gamma = 1.0
# Blur radius in pixels, 0..10. Only the live preview applies it.
blur = 0.0

# ---------------------------------------------------------------------------
# Geometry
# ---------------------------------------------------------------------------
# Crop rectangle in source pixels. Parts outside the source are transparent.
# [crop]
# x = 0
# y = 0
# width = 512
# height = 512

# Target box. With preserve_aspect the image is scaled to fit inside it,
# otherwise it is stretched to fill it exactly.
# [resize]
# width = 1024
# height = 1024
# preserve_aspect = true
"##
}
