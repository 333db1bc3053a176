//! Terminal outcome of a resolution attempt.

use std::fmt;

use bytes::Bytes;

/// Why a wrapper URL did not produce an image.
///
/// Diagnostic only; callers treat every variant as "omit this record".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// Input is not a wrapper URL.
    NotAWrapper,
    /// Wrapper page could not be fetched.
    PageFetchFailed,
    /// Wrapper page carried no form reference.
    NoFormRef,
    /// Manifest had no candidate attachment.
    EmptyManifest,
    /// Attachment content could not be fetched or decoded.
    DownloadFailed,
    /// Decoded content is not a well-formed raster image.
    InvalidImage,
    /// A previous failure for this case is still cached.
    CacheNegative(Box<UnresolvedReason>),
}

impl UnresolvedReason {
    /// Stable diagnostic code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotAWrapper => "not_a_wrapper",
            Self::PageFetchFailed => "page_fetch_failed",
            Self::NoFormRef => "no_form_ref",
            Self::EmptyManifest => "empty_manifest",
            Self::DownloadFailed => "download_failed",
            Self::InvalidImage => "invalid_image",
            Self::CacheNegative(_) => "cache_negative",
        }
    }

    /// Underlying failure, looking through cached negatives.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::CacheNegative(inner) => inner.root_cause(),
            other => other,
        }
    }
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CacheNegative(inner) => write!(f, "cache_negative ({inner})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Result handed back to the display pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedImage {
    /// Raw, validated image bytes, unchanged from the portal.
    Bytes(Bytes),
    /// No image could be produced.
    Unresolved(UnresolvedReason),
}

impl ResolvedImage {
    /// Returns true for image bytes.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Bytes(_))
    }

    /// Image bytes, if resolved.
    #[must_use]
    pub const fn bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            Self::Unresolved(_) => None,
        }
    }

    /// Failure reason, if unresolved.
    #[must_use]
    pub const fn reason(&self) -> Option<&UnresolvedReason> {
        match self {
            Self::Bytes(_) => None,
            Self::Unresolved(reason) => Some(reason),
        }
    }

    /// Form returned for a cache hit: negatives are tagged as cached.
    #[must_use]
    pub fn as_cache_hit(&self) -> Self {
        match self {
            Self::Bytes(bytes) => Self::Bytes(bytes.clone()),
            Self::Unresolved(UnresolvedReason::CacheNegative(inner)) => {
                Self::Unresolved(UnresolvedReason::CacheNegative(inner.clone()))
            }
            Self::Unresolved(reason) => {
                Self::Unresolved(UnresolvedReason::CacheNegative(Box::new(reason.clone())))
            }
        }
    }
}
