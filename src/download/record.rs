//! In-memory result of a single fetch.

use url::Url;

/// Body of a fetched resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Decoded text (the main page).
    Text(String),
    /// Raw bytes (images, stylesheets, scripts).
    Binary(Vec<u8>),
}

impl Payload {
    /// Returns the payload as bytes ready to be written to disk.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }

    /// Returns the text, if this payload was fetched as text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Returns `true` for an empty body.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One fetched resource: where it came from, what it contained, and the
/// filename it will be saved under.
#[derive(Debug, Clone)]
pub struct DownloadRecord {
    /// The URL that was requested.
    pub source_url: Url,
    /// Response body.
    pub payload: Payload,
    /// Name derived from the URL and `Content-Type`.
    pub filename: String,
}
