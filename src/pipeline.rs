//! End-to-end export and preview.
//!
//! A [`Pipeline`] owns one backend and strings the imaging operations
//! together for a [`SourceImage`]:
//!
//! ```text
//! export:   decode → crop? → exact filters → resize? → encode
//! ico:      decode → crop? → favicon bundle (resize → filters → png) → .ico
//! preview:  decode → preview render (CSS-style filters + blur)
//! ```
//!
//! Every call decodes the source afresh and keeps nothing afterwards. The
//! drawing surface is passed in by the caller: either an owned [`Surface`]
//! or a [`SharedSurface`] whose lease is held for the whole export, so two
//! exports on one surface run one after the other.

use crate::config::ExportRecipe;
use crate::imaging::{
    self, Encoded, FaviconSet, FilterParams, ImageBackend, PreviewFilter, Raster, Result,
    RustBackend, SharedSurface, Surface, TargetFormat,
};
use crate::metadata::{self, ImageMetadata, SourceImage};
use tracing::debug;

/// Decode, transform and encode source images with one backend.
pub struct Pipeline<B: ImageBackend = RustBackend> {
    backend: B,
}

impl Pipeline<RustBackend> {
    pub fn new() -> Self {
        Self::with_backend(RustBackend::new())
    }
}

impl Default for Pipeline<RustBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ImageBackend> Pipeline<B> {
    /// Use a specific backend (allows testing with mock).
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn metadata(&self, source: &SourceImage) -> Result<ImageMetadata> {
        metadata::get_metadata(&self.backend, source)
    }

    pub fn decode(&self, source: &SourceImage) -> Result<Raster> {
        imaging::decode(&self.backend, &source.bytes, source.declared_mime())
    }

    /// Run `recipe` against `source`.
    ///
    /// An [`Ico`](TargetFormat::Ico) recipe produces the favicon bundle
    /// packed into one `.ico`; its `resize` is ignored since the icon sizes
    /// are fixed, and `surface` is not drawn on.
    pub fn export(
        &self,
        source: &SourceImage,
        recipe: &ExportRecipe,
        surface: &mut Surface,
    ) -> Result<Encoded> {
        let raster = self.cropped(source, recipe)?;

        if recipe.format == TargetFormat::Ico {
            let set = imaging::generate_favicons(&self.backend, &raster, &recipe.filters)?;
            return set.to_ico();
        }

        let filtered = imaging::apply_exact(raster, &recipe.filters);
        let sized = match recipe.resize {
            Some(target) => imaging::resize(&self.backend, filtered, target)?,
            None => filtered,
        };
        let encoded =
            imaging::encode(&self.backend, surface, sized, recipe.format, recipe.quality)?;
        debug!(
            name = %source.name,
            format = %recipe.format,
            bytes = encoded.len(),
            "export finished"
        );
        Ok(encoded)
    }

    /// [`export`](Self::export) on a shared surface, holding its lease for
    /// the whole call.
    pub fn export_shared(
        &self,
        source: &SourceImage,
        recipe: &ExportRecipe,
        shared: &SharedSurface,
    ) -> Result<Encoded> {
        let mut lease = shared.acquire();
        self.export(source, recipe, &mut lease)
    }

    /// The three-size favicon bundle, with `filters` applied to every icon.
    pub fn favicons(&self, source: &SourceImage, filters: &FilterParams) -> Result<FaviconSet> {
        let raster = self.decode(source)?;
        imaging::generate_favicons(&self.backend, &raster, filters)
    }

    /// Approximate, fast rendering for live feedback. Honours blur.
    pub fn preview(&self, source: &SourceImage, filters: &FilterParams) -> Result<Raster> {
        let raster = self.decode(source)?;
        let filter = PreviewFilter::from_params(filters);
        if filter.is_identity() {
            return Ok(raster);
        }
        debug!(filter = %filter, "rendering preview");
        Ok(filter.render(&raster))
    }

    fn cropped(&self, source: &SourceImage, recipe: &ExportRecipe) -> Result<Raster> {
        let raster = self.decode(source)?;
        match recipe.crop {
            Some(rect) => imaging::crop(&raster, rect),
            None => Ok(raster),
        }
    }
}
