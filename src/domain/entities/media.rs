//! Media references as they appear on case records.

use bytes::Bytes;
use serde::Deserialize;

const DIRECT_IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// A record's media field: either a bare URL or an object wrapping one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MediaItem {
    /// Bare URL string.
    Url(String),
    /// Object with an optional `url` field.
    Wrapped {
        /// Wrapped URL.
        #[serde(default)]
        url: Option<String>,
    },
}

impl MediaItem {
    /// The URL carried by this item, if any and non-blank.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        let url = match self {
            Self::Url(url) => Some(url.as_str()),
            Self::Wrapped { url } => url.as_deref(),
        };
        url.map(str::trim).filter(|u| !u.is_empty())
    }
}

/// Returns true if the URL path ends in a known image extension.
/// The query string is ignored and the check is case-insensitive.
#[must_use]
pub fn is_direct_image_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or_default().to_lowercase();
    DIRECT_IMAGE_EXTENSIONS
        .iter()
        .any(|ext| path.ends_with(ext))
}

/// What the display pipeline should render for a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayImage {
    /// Publicly fetchable image link, passed through unchanged.
    Url(String),
    /// Bytes resolved from a protected attachment.
    Bytes(Bytes),
}
