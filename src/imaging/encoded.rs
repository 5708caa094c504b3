//! Encoded byte streams handed to the save/download collaborator.

use super::params::EncodedFormat;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Bytes produced by an export, tagged with what they actually are.
///
/// After a WebP fallback `format` is [`EncodedFormat::Png`], even though
/// WebP was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub format: EncodedFormat,
}

impl Encoded {
    pub fn new(bytes: Vec<u8>, format: EncodedFormat) -> Self {
        Self { bytes, format }
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:<mime>;base64,<payload>` for embedding or browser downloads.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.bytes))
    }

    /// Download file name: `{stem}.{ext}`, extension from the actual format.
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.format.extension())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_carries_mime_and_payload() {
        let encoded = Encoded::new(b"abc".to_vec(), EncodedFormat::Png);
        assert_eq!(encoded.to_data_url(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn file_name_uses_actual_format() {
        let encoded = Encoded::new(Vec::new(), EncodedFormat::Jpeg);
        assert_eq!(encoded.file_name("holiday"), "holiday.jpg");
        assert!(encoded.is_empty());
    }
}
