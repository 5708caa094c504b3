//! # Pixelprep
//!
//! A raster transformation pipeline: take one image, adjust it, resize it,
//! and re-encode it as PNG, JPEG, WebP, or a multi-resolution favicon bundle.
//! The crate is the core behind an image-editing front end; the UI, preset
//! catalogue, file picker and download trigger are collaborators that call in
//! through [`pipeline`], [`metadata`] and [`imaging`].
//!
//! # Architecture
//!
//! ```text
//! SourceImage ──decode──▶ Raster ──filter──▶ Raster ──resize──▶ Raster ──encode──▶ Encoded
//!                                  (exact or                        (background rule,
//!                                   preview)                         webp → png fallback)
//! ```
//!
//! Each stage is a function from value to value. A [`Raster`](imaging::Raster)
//! is moved from stage to stage and never shared; the only mutable state is
//! the drawing [`Surface`](imaging::Surface) used for background compositing,
//! which callers pass in explicitly.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Colour math, filters, resize, encode, favicon bundle, backend trait |
//! | [`pipeline`] | Decode → crop → filter → resize → encode for a [`SourceImage`](metadata::SourceImage) |
//! | [`metadata`] | Source images and the read-only metadata query |
//! | [`config`] | TOML export recipes: loading, validation, stock recipe |
//!
//! # Design Decisions
//!
//! ## Two Filter Paths
//!
//! The live preview and the final export apply the same named adjustments in
//! different ways. The preview ([`PreviewFilter`](imaging::PreviewFilter))
//! uses multiplicative percentages like a CSS `filter` string and supports
//! blur. The export path ([`apply_exact`](imaging::apply_exact)) works per
//! channel with additive brightness, a contrast stretch, a gamma curve and an
//! HSL saturation pass. It has no blur, so an exported image never shows the
//! blur the preview did.
//!
//! ## Output Sniffing Instead of Capability Flags
//!
//! Whether WebP can be produced is decided by looking at the bytes the encoder
//! returned. If they are not a RIFF/WEBP container the raster is encoded as
//! PNG, and the returned [`Encoded`](imaging::Encoded) reports `image/png`.
//!
//! ## Explicit Surface Ownership
//!
//! Drawing operations take `&mut Surface`. To share one surface between
//! threads, wrap it in a [`SharedSurface`](imaging::SharedSurface) and take a
//! lease with `acquire()`; leases are exclusive, so two exports never draw
//! into the same canvas at once.
//!
//! ## Pure-Rust Codecs
//!
//! Decoding, resampling and encoding use the `image` crate only. There are no
//! system libraries to install.
//!
//! ## Logging
//!
//! Stages emit `tracing` events (`debug` per stage, `warn` on the WebP
//! fallback). The library never installs a subscriber.

pub mod config;
pub mod imaging;
pub mod metadata;
pub mod pipeline;
