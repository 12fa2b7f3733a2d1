use crate::error::{MediaError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cutbench_core::types::MediaKind;

/// Encode raw bytes as `data:<mime>;base64,<payload>`.
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// A borrowed view of a base64 data URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUri<'a> {
    pub mime_type: &'a str,
    pub payload: &'a str,
}

impl<'a> DataUri<'a> {
    /// Split a `data:<mime>[;param...];base64,<payload>` string. Only base64
    /// URIs are accepted; the payload itself is not decoded here.
    pub fn parse(uri: &'a str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| MediaError::InvalidDataUri("missing data: scheme".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| MediaError::InvalidDataUri("missing ',' separator".into()))?;
        let params = header
            .strip_suffix(";base64")
            .ok_or_else(|| MediaError::InvalidDataUri("payload is not base64".into()))?;
        let mime_type = params.split(';').next().unwrap_or("");
        if !mime_type.contains('/') {
            return Err(MediaError::InvalidDataUri(format!(
                "bad MIME type '{mime_type}'"
            )));
        }
        Ok(Self { mime_type, payload })
    }

    pub fn media_kind(&self) -> MediaKind {
        MediaKind::from_mime(self.mime_type)
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.payload)
            .map_err(|e| MediaError::InvalidDataUri(e.to_string()))
    }
}
