use crate::sample::SampleValue;
use indexmap::IndexMap;
use serde::Serialize;

/// Media types with a dedicated constant
pub mod mime {
    pub const APPLICATION_JSON: &str = "application/json";
    pub const APPLICATION_XML: &str = "application/xml";
    pub const APPLICATION_X_WWW_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
    pub const APPLICATION_JAVASCRIPT: &str = "application/javascript";
    pub const APPLICATION_PDF: &str = "application/pdf";
    pub const APPLICATION_ZIP: &str = "application/zip";

    pub const TEXT_HTML: &str = "text/html";
    pub const TEXT_PLAIN: &str = "text/plain";
    pub const TEXT_CSS: &str = "text/css";
    pub const TEXT_CSV: &str = "text/csv";
    pub const TEXT_JAVASCRIPT: &str = "text/javascript";

    pub const IMAGE_JPEG: &str = "image/jpeg";
    pub const IMAGE_PNG: &str = "image/png";
    pub const IMAGE_GIF: &str = "image/gif";
    pub const IMAGE_SVG_XML: &str = "image/svg+xml";
    pub const IMAGE_WEBP: &str = "image/webp";

    pub const AUDIO_MPEG: &str = "audio/mpeg";
    pub const AUDIO_OGG: &str = "audio/ogg";
    pub const AUDIO_WAV: &str = "audio/wav";

    pub const VIDEO_MP4: &str = "video/mp4";
    pub const VIDEO_MPEG: &str = "video/mpeg";
    pub const VIDEO_OGG: &str = "video/ogg";

    pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";
}

/// Sample payloads keyed by media type, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentType {
    entries: IndexMap<String, SampleValue>,
}

impl ContentType {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single `application/json` sample
    pub fn json<T>(value: &T) -> Self
    where
        T: ?Sized + Serialize,
    {
        Self::new().with(mime::APPLICATION_JSON, value)
    }

    /// Add a sample for `media_type`, replacing any earlier one
    pub fn with<T>(mut self, media_type: &str, value: &T) -> Self
    where
        T: ?Sized + Serialize,
    {
        self.insert(media_type, SampleValue::of(value));
        self
    }

    pub fn insert(&mut self, media_type: impl Into<String>, value: SampleValue) {
        self.entries.insert(media_type.into(), value);
    }

    pub fn get(&self, media_type: &str) -> Option<&SampleValue> {
        self.entries.get(media_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SampleValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
