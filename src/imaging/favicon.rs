//! Multi-resolution favicon bundle.
//!
//! Every call produces exactly three PNG icons, `16x16`, `32x32` and
//! `48x48`, each resized without preserving aspect, run through the exact
//! filters, and encoded as PNG. If any size fails the whole bundle fails;
//! callers never see a partial set.
//!
//! The `.ico` container is only a packaging step on top of the PNGs
//! ([`FaviconSet::to_ico`]).

use super::backend::ImageBackend;
use super::calculations::favicon_label;
use super::encoded::Encoded;
use super::filters::apply_exact;
use super::operations::{PipelineError, Result, encode, resize};
use super::params::{EncodedFormat, FilterParams, Quality, SizeSpec, TargetFormat};
use super::raster::{Raster, Surface};
use image::ExtendedColorType;
use image::codecs::ico::{IcoEncoder, IcoFrame};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Icon edge lengths in every bundle.
pub const FAVICON_SIZES: [u32; 3] = [16, 32, 48];

/// Encoded icons keyed by `"{n}x{n}"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaviconSet {
    icons: BTreeMap<String, Encoded>,
}

impl FaviconSet {
    pub fn get(&self, label: &str) -> Option<&Encoded> {
        self.icons.get(label)
    }

    /// Labels in ascending size order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        FAVICON_SIZES
            .into_iter()
            .filter_map(|size| self.icons.get_key_value(&favicon_label(size)))
            .map(|(label, _)| label.as_str())
    }

    /// `(size, icon)` pairs in ascending size order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Encoded)> {
        FAVICON_SIZES
            .into_iter()
            .filter_map(|size| self.icons.get(&favicon_label(size)).map(|icon| (size, icon)))
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<String, Encoded> {
        self.icons
    }

    /// Pack every icon into a single multi-resolution `.ico`.
    pub fn to_ico(&self) -> Result<Encoded> {
        let frames = self
            .iter()
            .map(|(size, icon)| {
                IcoFrame::with_encoded(icon.bytes.as_slice(), size, size, ExtendedColorType::Rgba8)
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| PipelineError::Encode(format!("ICO frame: {e}")))?;

        let mut out = Vec::new();
        IcoEncoder::new(&mut out)
            .encode_images(&frames)
            .map_err(|e| PipelineError::Encode(format!("ICO encode failed: {e}")))?;
        Ok(Encoded::new(out, EncodedFormat::Ico))
    }

    /// JSON object mapping each label to a `data:` URL.
    pub fn to_manifest_json(&self) -> Result<String> {
        #[derive(Serialize)]
        struct Entry<'a> {
            mime_type: &'a str,
            bytes: usize,
            data_url: String,
        }

        let manifest: BTreeMap<&str, Entry<'_>> = self
            .icons
            .iter()
            .map(|(label, icon)| {
                (
                    label.as_str(),
                    Entry {
                        mime_type: icon.mime_type(),
                        bytes: icon.len(),
                        data_url: icon.to_data_url(),
                    },
                )
            })
            .collect();
        serde_json::to_string_pretty(&manifest)
            .map_err(|e| PipelineError::Encode(format!("favicon manifest: {e}")))
    }
}

/// Render the fixed favicon size set from `raster`.
///
/// The source raster is only borrowed; each size starts from a fresh copy.
/// Icons are plain PNG with no background rule, so no drawing surface is
/// involved.
pub fn generate_favicons(
    backend: &impl ImageBackend,
    raster: &Raster,
    filters: &FilterParams,
) -> Result<FaviconSet> {
    let mut icons = BTreeMap::new();

    for size in FAVICON_SIZES {
        let icon = render_icon(backend, raster, filters, size).map_err(|e| {
            PipelineError::BundlePartialFailure {
                size,
                source: Box::new(e),
            }
        })?;
        icons.insert(favicon_label(size), icon);
    }

    debug!(sizes = ?FAVICON_SIZES, "favicon bundle generated");
    Ok(FaviconSet { icons })
}

fn render_icon(
    backend: &impl ImageBackend,
    raster: &Raster,
    filters: &FilterParams,
    size: u32,
) -> Result<Encoded> {
    let resized = resize(backend, raster.clone(), SizeSpec::new(size, size, false))?;
    let filtered = apply_exact(resized, filters);
    // PNG has no background rule; the scratch surface is never drawn on.
    encode(
        backend,
        &mut Surface::new(),
        filtered,
        TargetFormat::Png,
        Quality::default(),
    )
}
