//! Resolution error types.

use thiserror::Error;

use crate::domain::entities::UnresolvedReason;

/// Broad failure class of a resolution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Timeout, connection failure or non-2xx status.
    Transport,
    /// Expected token or field absent from a response.
    Parse,
    /// Bytes are not a usable image.
    Content,
}

/// Failure of one step of a resolution attempt.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ResolveError {
    #[error("wrapper page fetch failed: {message}")]
    PageFetch { message: String },

    #[error("wrapper page carried no form reference")]
    NoFormRef,

    #[error("no attachment candidate in manifest")]
    EmptyManifest,

    #[error("attachment download failed: {message}")]
    Download { message: String },

    #[error("attachment payload field missing from response")]
    PayloadMissing,

    #[error("attachment payload is not valid base64: {message}")]
    PayloadDecode { message: String },

    #[error("attachment is not a valid image: {message}")]
    InvalidImage { message: String },
}

impl ResolveError {
    /// Creates page fetch error.
    #[must_use]
    pub fn page_fetch(message: impl Into<String>) -> Self {
        Self::PageFetch {
            message: message.into(),
        }
    }

    /// Creates download error.
    #[must_use]
    pub fn download(message: impl Into<String>) -> Self {
        Self::Download {
            message: message.into(),
        }
    }

    /// Creates payload decode error.
    #[must_use]
    pub fn payload_decode(message: impl Into<String>) -> Self {
        Self::PayloadDecode {
            message: message.into(),
        }
    }

    /// Creates invalid image error.
    #[must_use]
    pub fn invalid_image(message: impl Into<String>) -> Self {
        Self::InvalidImage {
            message: message.into(),
        }
    }

    /// Returns the failure class.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::PageFetch { .. } | Self::Download { .. } => ErrorKind::Transport,
            Self::NoFormRef | Self::EmptyManifest | Self::PayloadMissing => ErrorKind::Parse,
            Self::PayloadDecode { .. } | Self::InvalidImage { .. } => ErrorKind::Content,
        }
    }

    /// Diagnostic reason reported to callers.
    #[must_use]
    pub const fn reason(&self) -> UnresolvedReason {
        match self {
            Self::PageFetch { .. } => UnresolvedReason::PageFetchFailed,
            Self::NoFormRef => UnresolvedReason::NoFormRef,
            Self::EmptyManifest => UnresolvedReason::EmptyManifest,
            Self::Download { .. } | Self::PayloadMissing | Self::PayloadDecode { .. } => {
                UnresolvedReason::DownloadFailed
            }
            Self::InvalidImage { .. } => UnresolvedReason::InvalidImage,
        }
    }
}
