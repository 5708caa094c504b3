//! Source images and the read-only metadata query.
//!
//! A [`SourceImage`] is what the file-picker or drag-and-drop collaborator
//! hands over: raw bytes plus whatever the platform told it about the file
//! (declared content type, name, modification time). Nothing here mutates
//! or keeps the bytes beyond the call.
//!
//! ## MIME resolution
//!
//! The declared content type wins when present. Otherwise the type is
//! sniffed from the byte signature, and failing that left empty. This
//! mirrors what a browser reports for `File.type`.

use crate::imaging::{self, ImageBackend, Result};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Raw image bytes plus the facts the platform reported about them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    /// Declared content type, e.g. `image/png`.
    pub mime_type: Option<String>,
    pub name: String,
    /// Milliseconds since the Unix epoch.
    pub last_modified: Option<u64>,
}

impl SourceImage {
    pub fn new(bytes: Vec<u8>, mime_type: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.map(String::from),
            name: name.into(),
            last_modified: None,
        }
    }

    /// Read a file from disk, filling name, MIME (from the extension) and
    /// modification time.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let last_modified = std::fs::metadata(path)?
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64);
        let mime_type = ImageFormat::from_path(path)
            .ok()
            .map(|f| f.to_mime_type().to_string());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            bytes,
            mime_type,
            name,
            last_modified,
        })
    }

    pub fn declared_mime(&self) -> Option<&str> {
        self.mime_type.as_deref().filter(|m| !m.is_empty())
    }

    /// Declared MIME type, else the one implied by the byte signature.
    pub fn resolved_mime(&self) -> Option<String> {
        self.declared_mime().map(String::from).or_else(|| {
            image::guess_format(&self.bytes)
                .ok()
                .map(|f| f.to_mime_type().to_string())
        })
    }
}

/// Result of [`get_metadata`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub byte_size: u64,
    pub mime_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<u64>,
}

/// Inspect a source without decoding its pixels.
///
/// Fails with [`Decode`](crate::imaging::PipelineError::Decode) when the
/// dimensions cannot be read.
pub fn get_metadata(backend: &impl ImageBackend, source: &SourceImage) -> Result<ImageMetadata> {
    let dims = imaging::identify(backend, &source.bytes, source.declared_mime())?;
    Ok(ImageMetadata {
        width: dims.width,
        height: dims.height,
        byte_size: source.bytes.len() as u64,
        mime_type: source.resolved_mime().unwrap_or_default(),
        name: source.name.clone(),
        last_modified: source.last_modified,
    })
}
